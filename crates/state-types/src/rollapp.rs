use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use rollhub_identifiers::{HubHeight, RollappHeight, RollappId};
use serde::{Deserialize, Serialize};

/// A fork generation of a rollapp chain.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct Revision {
    number: u64,
    start_height: RollappHeight,
}

impl Revision {
    pub fn new(number: u64, start_height: RollappHeight) -> Self {
        Self {
            number,
            start_height,
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// First rollapp height produced under this revision.
    pub fn start_height(&self) -> RollappHeight {
        self.start_height
    }
}

/// Hub-side record of a registered rollapp.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct Rollapp {
    rollapp_id: RollappId,
    owner: String,
    genesis_height: RollappHeight,
    frozen: bool,
    revisions: Vec<Revision>,
    liveness_event_height: Option<HubHeight>,
    liveness_countdown_start_height: HubHeight,
}

impl Rollapp {
    /// Creates a rollapp at revision 0 whose first batch must start at
    /// `genesis_height`.
    pub fn new(rollapp_id: RollappId, owner: String, genesis_height: RollappHeight) -> Self {
        Self {
            rollapp_id,
            owner,
            genesis_height,
            frozen: false,
            revisions: vec![Revision::new(0, 0)],
            liveness_event_height: None,
            liveness_countdown_start_height: 0,
        }
    }

    pub fn rollapp_id(&self) -> &RollappId {
        &self.rollapp_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn genesis_height(&self) -> RollappHeight {
        self.genesis_height
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn latest_revision(&self) -> Revision {
        self.revisions
            .last()
            .copied()
            .unwrap_or_else(|| Revision::new(0, 0))
    }

    pub fn revision_number(&self) -> u64 {
        self.latest_revision().number()
    }

    pub fn revision_start_height(&self) -> RollappHeight {
        self.latest_revision().start_height()
    }

    /// Starts the next revision at `start_height`, returning it.
    pub fn bump_revision(&mut self, start_height: RollappHeight) -> Revision {
        let rev = Revision::new(self.revision_number() + 1, start_height);
        self.revisions.push(rev);
        rev
    }

    pub fn liveness_event_height(&self) -> Option<HubHeight> {
        self.liveness_event_height
    }

    pub fn set_liveness_event_height(&mut self, height: Option<HubHeight>) {
        self.liveness_event_height = height;
    }

    pub fn liveness_countdown_start_height(&self) -> HubHeight {
        self.liveness_countdown_start_height
    }

    pub fn set_liveness_countdown_start_height(&mut self, height: HubHeight) {
        self.liveness_countdown_start_height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_revision() {
        let mut ra = Rollapp::new(RollappId::from("ra_1-1"), "owner".to_owned(), 1);
        assert_eq!(ra.revision_number(), 0);
        assert_eq!(ra.revision_start_height(), 0);

        let rev = ra.bump_revision(55);
        assert_eq!(rev.number(), 1);
        assert_eq!(ra.revision_number(), 1);
        assert_eq!(ra.revision_start_height(), 55);

        ra.bump_revision(55);
        assert_eq!(ra.revision_number(), 2);
        assert_eq!(ra.revisions().len(), 3);
    }
}
