use stablemix_types::{AddToPerpetualPayload, OpenPerpetualPayload, Result, RouterEvent};

use crate::dispatcher::Invocation;

impl Invocation<'_> {
    /// The id the manager assigns is only observable through the
    /// `PerpetualOpened` event.
    pub(crate) fn open_perpetual(&mut self, p: OpenPerpetualPayload) -> Result<()> {
        let pair = self.pair(p.stablecoin, p.collateral)?;
        let this = self.this();
        let margin = self.held(pair.collateral, p.margin);
        self.ensure_allowance(pair.collateral, pair.perpetual_manager, margin)?;

        let perpetual_id = self.chain.open_perpetual(
            pair.perpetual_manager,
            this,
            p.owner,
            margin,
            p.committed_amount,
            p.max_oracle_rate,
            p.min_net_margin,
        )?;
        tracing::debug!(
            perpetual = %perpetual_id,
            owner = %p.owner.short(),
            %margin,
            "Perpetual opened"
        );
        self.emit(RouterEvent::PerpetualOpened {
            perpetual_manager: pair.perpetual_manager,
            perpetual_id,
            owner: p.owner,
        });
        Ok(())
    }

    pub(crate) fn add_to_perpetual(&mut self, p: AddToPerpetualPayload) -> Result<()> {
        let pair = self.pair(p.stablecoin, p.collateral)?;
        let this = self.this();
        let amount = self.held(pair.collateral, p.amount);
        self.ensure_allowance(pair.collateral, pair.perpetual_manager, amount)?;

        self.chain
            .add_to_perpetual(pair.perpetual_manager, this, p.perpetual_id, amount)?;
        self.emit(RouterEvent::PerpetualMarginAdded {
            perpetual_manager: pair.perpetual_manager,
            perpetual_id: p.perpetual_id,
            amount,
        });
        Ok(())
    }
}
