//! Governor and guardian roles.
//!
//! Governors form a set that can never become empty. There is exactly one
//! guardian, and it is never also a governor.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stablemix_types::{Address, MixerError, Result};

/// A change to the router's roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleChange {
    AddGovernor(Address),
    RemoveGovernor(Address),
    SetGuardian(Address),
}

#[derive(Debug, Clone)]
pub struct AccessControl {
    governors: BTreeSet<Address>,
    guardian: Address,
}

impl AccessControl {
    /// # Errors
    /// `ZeroAddress` if either role is unset, `InvalidConditions` if both
    /// roles are the same address.
    pub fn new(governor: Address, guardian: Address) -> Result<Self> {
        if governor.is_zero() || guardian.is_zero() {
            return Err(MixerError::ZeroAddress);
        }
        if governor == guardian {
            return Err(MixerError::InvalidConditions {
                reason: "governor and guardian must differ".to_string(),
            });
        }
        Ok(Self {
            governors: BTreeSet::from([governor]),
            guardian,
        })
    }

    #[must_use]
    pub fn is_governor(&self, who: Address) -> bool {
        self.governors.contains(&who)
    }

    #[must_use]
    pub fn is_guardian(&self, who: Address) -> bool {
        self.guardian == who
    }

    pub fn governors(&self) -> impl Iterator<Item = Address> + '_ {
        self.governors.iter().copied()
    }

    #[must_use]
    pub fn guardian(&self) -> Address {
        self.guardian
    }

    /// # Errors
    /// `NotGovernorOrGuardian` unless `caller` holds either role.
    pub fn require_governor_or_guardian(&self, caller: Address) -> Result<()> {
        if self.is_governor(caller) || self.is_guardian(caller) {
            Ok(())
        } else {
            Err(MixerError::NotGovernorOrGuardian(caller))
        }
    }

    /// Apply a role change on behalf of a governor or the guardian.
    ///
    /// # Errors
    /// `NotGovernorOrGuardian`, `ZeroAddress`, `AlreadyAdded`, or
    /// `InvalidConditions` when the change would break the role invariants.
    pub fn apply(&mut self, caller: Address, change: RoleChange) -> Result<()> {
        self.require_governor_or_guardian(caller)?;
        match change {
            RoleChange::AddGovernor(who) => {
                if who.is_zero() {
                    return Err(MixerError::ZeroAddress);
                }
                if who == self.guardian {
                    return Err(MixerError::InvalidConditions {
                        reason: "guardian cannot become governor".to_string(),
                    });
                }
                if !self.governors.insert(who) {
                    return Err(MixerError::AlreadyAdded);
                }
            }
            RoleChange::RemoveGovernor(who) => {
                if !self.is_governor(who) {
                    return Err(MixerError::InvalidConditions {
                        reason: format!("{who} is not a governor"),
                    });
                }
                if self.governors.len() == 1 {
                    return Err(MixerError::InvalidConditions {
                        reason: "cannot remove the last governor".to_string(),
                    });
                }
                self.governors.remove(&who);
            }
            RoleChange::SetGuardian(who) => {
                if who.is_zero() {
                    return Err(MixerError::ZeroAddress);
                }
                if self.is_governor(who) {
                    return Err(MixerError::InvalidConditions {
                        reason: "governor cannot become guardian".to_string(),
                    });
                }
                self.guardian = who;
            }
        }
        tracing::info!(caller = %caller.short(), ?change, "Roles updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(label: &str) -> Address {
        Address::derive(label.as_bytes())
    }

    fn make_access() -> AccessControl {
        AccessControl::new(addr("gov"), addr("guardian")).unwrap()
    }

    #[test]
    fn same_governor_and_guardian_rejected() {
        let err = AccessControl::new(addr("gov"), addr("gov")).unwrap_err();
        assert!(matches!(err, MixerError::InvalidConditions { .. }));
        assert!(matches!(
            AccessControl::new(Address::ZERO, addr("guardian")),
            Err(MixerError::ZeroAddress)
        ));
    }

    #[test]
    fn last_governor_cannot_leave() {
        let mut access = make_access();
        let err = access
            .apply(addr("gov"), RoleChange::RemoveGovernor(addr("gov")))
            .unwrap_err();
        assert!(matches!(err, MixerError::InvalidConditions { .. }));

        access
            .apply(addr("gov"), RoleChange::AddGovernor(addr("gov2")))
            .unwrap();
        access
            .apply(addr("gov2"), RoleChange::RemoveGovernor(addr("gov")))
            .unwrap();
        assert!(!access.is_governor(addr("gov")));
        assert_eq!(access.governors().collect::<Vec<_>>(), vec![addr("gov2")]);
    }

    #[test]
    fn guardian_manages_governors() {
        let mut access = make_access();
        access
            .apply(addr("guardian"), RoleChange::AddGovernor(addr("gov2")))
            .unwrap();
        access
            .apply(addr("guardian"), RoleChange::RemoveGovernor(addr("gov")))
            .unwrap();
        assert_eq!(access.governors().collect::<Vec<_>>(), vec![addr("gov2")]);

        // Still bound by the role invariants.
        assert!(matches!(
            access.apply(addr("guardian"), RoleChange::RemoveGovernor(addr("gov2"))),
            Err(MixerError::InvalidConditions { .. })
        ));
        assert!(matches!(
            access.apply(addr("guardian"), RoleChange::AddGovernor(addr("guardian"))),
            Err(MixerError::InvalidConditions { .. })
        ));
    }

    #[test]
    fn outsiders_cannot_change_roles() {
        let mut access = make_access();
        let err = access
            .apply(addr("mallory"), RoleChange::AddGovernor(addr("mallory")))
            .unwrap_err();
        assert!(matches!(err, MixerError::NotGovernorOrGuardian(_)));
        assert!(!access.is_governor(addr("mallory")));
    }

    #[test]
    fn guardian_can_hand_over() {
        let mut access = make_access();
        access
            .apply(addr("guardian"), RoleChange::SetGuardian(addr("guardian2")))
            .unwrap();
        assert!(access.is_guardian(addr("guardian2")));
        assert!(!access.is_guardian(addr("guardian")));
    }

    #[test]
    fn roles_stay_disjoint() {
        let mut access = make_access();
        assert!(matches!(
            access.apply(addr("gov"), RoleChange::SetGuardian(addr("gov"))),
            Err(MixerError::InvalidConditions { .. })
        ));
        assert!(matches!(
            access.apply(addr("gov"), RoleChange::AddGovernor(addr("guardian"))),
            Err(MixerError::InvalidConditions { .. })
        ));
        assert!(matches!(
            access.apply(addr("gov"), RoleChange::AddGovernor(addr("gov"))),
            Err(MixerError::AlreadyAdded)
        ));
    }

    #[test]
    fn outsiders_rejected() {
        let access = make_access();
        assert!(matches!(
            access.require_governor_or_guardian(addr("mallory")),
            Err(MixerError::NotGovernorOrGuardian(_))
        ));
        access.require_governor_or_guardian(addr("guardian")).unwrap();
    }
}
