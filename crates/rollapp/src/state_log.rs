//! Per-rollapp append-only log of state batches.

use rollhub_identifiers::{RollappHeight, RollappId, StateInfoIndex};
use rollhub_state_types::{IHubStateAccessor, Rollapp, StateInfo};

use crate::errors::{RollappError, RollappResult};

/// Gets the batch at `index`.
pub fn get_state_info<'s, S: IHubStateAccessor>(
    state: &'s S,
    rollapp_id: &RollappId,
    index: u64,
) -> RollappResult<&'s StateInfo> {
    state
        .get_state_info(rollapp_id, index)
        .ok_or_else(|| RollappError::MissingStateInfo(rollapp_id.clone(), index))
}

/// Gets the latest batch, if the rollapp ever posted one.
pub fn latest_state_info<'s, S: IHubStateAccessor>(
    state: &'s S,
    rollapp_id: &RollappId,
) -> RollappResult<Option<&'s StateInfo>> {
    match state.latest_state_index(rollapp_id) {
        Some(index) => get_state_info(state, rollapp_id, index).map(Some),
        None => Ok(None),
    }
}

/// Gets the latest finalized batch, if any.
pub fn latest_finalized_state_info<'s, S: IHubStateAccessor>(
    state: &'s S,
    rollapp_id: &RollappId,
) -> RollappResult<Option<&'s StateInfo>> {
    match state.latest_finalized_index(rollapp_id) {
        Some(index) => get_state_info(state, rollapp_id, index).map(Some),
        None => Ok(None),
    }
}

/// Appends a batch to the rollapp's log, assigning it the next index.
///
/// The batch must start right after the latest one, or at the rollapp's
/// genesis height if it's the first.
pub fn append_state_info<S: IHubStateAccessor>(
    state: &mut S,
    rollapp: &Rollapp,
    mut info: StateInfo,
) -> RollappResult<StateInfoIndex> {
    let rollapp_id = rollapp.rollapp_id();
    let (next_index, expected_start) = match latest_state_info(state, rollapp_id)? {
        Some(prev) => (prev.index().index() + 1, prev.latest_height() + 1),
        None => (1, rollapp.genesis_height()),
    };

    if info.start_height() != expected_start {
        return Err(RollappError::WrongBlockHeight {
            rollapp_id: rollapp_id.clone(),
            expected: expected_start,
            got: info.start_height(),
        });
    }

    let index = StateInfoIndex::new(rollapp_id.clone(), next_index);
    info.set_index(index.clone());
    state.put_state_info(info);
    state.set_latest_state_index(rollapp_id, next_index);
    Ok(index)
}

/// Finds the batch covering a rollapp height.
///
/// Binary searches `[1, latest]`, batches are contiguous so their ranges are
/// sorted by index.
pub fn find_state_info_by_height<'s, S: IHubStateAccessor>(
    state: &'s S,
    rollapp_id: &RollappId,
    height: RollappHeight,
) -> RollappResult<&'s StateInfo> {
    if height == 0 {
        return Err(RollappError::InvalidHeight(height));
    }
    if state.get_rollapp(rollapp_id).is_none() {
        return Err(RollappError::UnknownRollapp(rollapp_id.clone()));
    }

    let latest = latest_state_info(state, rollapp_id)?
        .ok_or_else(|| RollappError::NoStateUpdates(rollapp_id.clone()))?;
    if height > latest.latest_height() {
        return Err(RollappError::StateNotExists(rollapp_id.clone(), height));
    }
    if height >= latest.start_height() {
        return Ok(latest);
    }

    let first = get_state_info(state, rollapp_id, 1)?;
    if height < first.start_height() {
        return Err(RollappError::StateNotExists(rollapp_id.clone(), height));
    }

    let mut lo = 1;
    let mut hi = latest.index().index();
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let info = get_state_info(state, rollapp_id, mid)?;
        if info.contains_height(height) {
            return Ok(info);
        }
        if height < info.start_height() {
            hi = mid - 1;
        } else {
            lo = mid + 1;
        }
    }

    Err(RollappError::BrokenStateLog(
        rollapp_id.clone(),
        format!("no batch covers height {height} inside the committed range"),
    ))
}

#[cfg(test)]
mod tests {
    use rollhub_identifiers::SequencerAddr;
    use rollhub_state_types::HubState;
    use rollhub_test_utils::{test_block_descriptors, test_rollapp, test_rollapp_id};

    use super::*;
    use crate::errors::ErrorKind;

    fn batch(id: &RollappId, start: u64, n: u64) -> StateInfo {
        StateInfo::new(
            StateInfoIndex::new(id.clone(), 0),
            SequencerAddr::from("seq"),
            start,
            String::new(),
            1,
            0,
            None,
            test_block_descriptors(start, n),
        )
    }

    fn setup(batches: u64, size: u64) -> (HubState, RollappId) {
        let id = test_rollapp_id(1);
        let ra = test_rollapp(&id);
        let mut state = HubState::new();
        state.put_rollapp(ra.clone());
        for i in 0..batches {
            append_state_info(&mut state, &ra, batch(&id, 1 + i * size, size)).unwrap();
        }
        (state, id)
    }

    #[test]
    fn test_append_assigns_dense_indexes() {
        let (state, id) = setup(3, 10);
        assert_eq!(state.latest_state_index(&id), Some(3));
        for i in 1..=3 {
            let si = get_state_info(&state, &id, i).unwrap();
            assert_eq!(si.index().index(), i);
            assert_eq!(si.start_height(), 1 + (i - 1) * 10);
        }
    }

    #[test]
    fn test_append_rejects_gap_and_overlap() {
        let (mut state, id) = setup(1, 10);
        let ra = state.get_rollapp(&id).cloned().unwrap();

        let err = append_state_info(&mut state, &ra, batch(&id, 12, 5)).unwrap_err();
        assert!(matches!(
            err,
            RollappError::WrongBlockHeight { expected: 11, got: 12, .. }
        ));

        let err = append_state_info(&mut state, &ra, batch(&id, 10, 5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
        assert_eq!(state.latest_state_index(&id), Some(1));
    }

    #[test]
    fn test_first_batch_anchored_at_genesis() {
        let id = test_rollapp_id(2);
        let ra = Rollapp::new(id.clone(), "o".to_owned(), 100);
        let mut state = HubState::new();
        state.put_rollapp(ra.clone());

        assert!(append_state_info(&mut state, &ra, batch(&id, 1, 5)).is_err());
        append_state_info(&mut state, &ra, batch(&id, 100, 5)).unwrap();

        let err = find_state_info_by_height(&state, &id, 50).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            find_state_info_by_height(&state, &id, 104)
                .unwrap()
                .index()
                .index(),
            1
        );
    }

    #[test]
    fn test_find_by_height_every_height() {
        let (state, id) = setup(10, 10);
        for h in 1..=100 {
            let si = find_state_info_by_height(&state, &id, h).unwrap();
            assert_eq!(si.index().index(), (h - 1) / 10 + 1, "height {h}");
            assert!(si.contains_height(h));
        }
    }

    #[test]
    fn test_find_by_height_uneven_batches() {
        let id = test_rollapp_id(3);
        let ra = test_rollapp(&id);
        let mut state = HubState::new();
        state.put_rollapp(ra.clone());
        let mut start = 1;
        for size in [1, 7, 2, 30, 1, 1, 5] {
            append_state_info(&mut state, &ra, batch(&id, start, size)).unwrap();
            start += size;
        }
        for h in 1..start {
            let si = find_state_info_by_height(&state, &id, h).unwrap();
            assert!(si.contains_height(h), "height {h}");
        }
    }

    #[test]
    fn test_find_by_height_errors() {
        let (state, id) = setup(2, 10);
        assert_eq!(
            find_state_info_by_height(&state, &id, 0).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert!(matches!(
            find_state_info_by_height(&state, &id, 21),
            Err(RollappError::StateNotExists(_, 21))
        ));
        assert!(matches!(
            find_state_info_by_height(&state, &test_rollapp_id(9), 1),
            Err(RollappError::UnknownRollapp(_))
        ));

        let (empty, id) = setup(0, 10);
        assert_eq!(
            find_state_info_by_height(&empty, &id, 1).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
