use rollhub_db_types::{traits::HubStateDatabase, DbError};
use rollhub_identifiers::StateInfoIndex;
use rollhub_state_types::{HubState, HubWriteBatch, IHubStateAccessor, StateInfo};
use rollhub_test_utils::{test_rollapp, test_rollapp_id, ArbitraryGenerator};

fn sample_state(n: u32) -> HubState {
    let id = test_rollapp_id(n);
    let mut state = HubState::new();
    state.put_rollapp(test_rollapp(&id));

    let mut info: StateInfo = ArbitraryGenerator::new().generate();
    info.set_index(StateInfoIndex::new(id.clone(), 1));
    state.put_state_info(info);
    state.set_latest_state_index(&id, 1);
    state
}

fn sample_batch(n: u32) -> HubWriteBatch {
    let mut wb = HubWriteBatch::new();
    wb.put_rollapp(test_rollapp(&test_rollapp_id(n)));
    wb.set_latest_state_index(&test_rollapp_id(n), 3);
    wb
}

pub fn test_put_and_get_hub_state(db: &impl HubStateDatabase) {
    let state = sample_state(1);

    db.put_toplevel_hub_state(5, state.clone())
        .expect("test: put");
    let retrieved = db
        .get_toplevel_hub_state(5)
        .expect("test: get")
        .unwrap();
    assert_eq!(retrieved, state);

    assert!(db.get_toplevel_hub_state(6).expect("test: get").is_none());
}

pub fn test_get_latest_hub_state(db: &impl HubStateDatabase) {
    assert!(db
        .get_latest_toplevel_hub_state()
        .expect("test: get latest empty")
        .is_none());

    // Heights straddling a byte boundary, to catch non big-endian keys.
    db.put_toplevel_hub_state(255, sample_state(1))
        .expect("test: put state 1");
    let state2 = sample_state(2);
    db.put_toplevel_hub_state(256, state2.clone())
        .expect("test: put state 2");
    db.put_toplevel_hub_state(3, sample_state(3))
        .expect("test: put state 3");

    let (height, state) = db
        .get_latest_toplevel_hub_state()
        .expect("test: get latest")
        .unwrap();
    assert_eq!(height, 256);
    assert_eq!(state, state2);
}

pub fn test_delete_hub_state(db: &impl HubStateDatabase) {
    let state = sample_state(1);
    db.put_toplevel_hub_state(1, state).expect("test: put");
    assert!(db.get_toplevel_hub_state(1).expect("test: get").is_some());

    db.del_toplevel_hub_state(1).expect("test: delete");
    let deleted = db
        .get_toplevel_hub_state(1)
        .expect("test: get after delete");
    assert!(deleted.is_none());

    // Deleting again is fine.
    db.del_toplevel_hub_state(1).expect("test: delete missing");
}

pub fn test_write_batch_operations(db: &impl HubStateDatabase) {
    let wb = sample_batch(1);

    db.put_hub_write_batch(7, wb.clone())
        .expect("test: put write batch");
    let retrieved = db
        .get_hub_write_batch(7)
        .expect("test: get write batch")
        .unwrap();
    assert_eq!(retrieved, wb);

    db.del_hub_write_batch(7)
        .expect("test: delete write batch");
    let deleted = db
        .get_hub_write_batch(7)
        .expect("test: get after delete");
    assert!(deleted.is_none());
}

pub fn test_put_block_output(db: &impl HubStateDatabase) {
    let mut state = sample_state(1);
    let wb = sample_batch(2);
    state.apply_write_batch(wb.clone());

    db.put_block_output(9, wb.clone(), state.clone())
        .expect("test: put block output");
    assert_eq!(db.get_hub_write_batch(9).expect("test: get wb"), Some(wb));
    assert_eq!(
        db.get_latest_toplevel_hub_state().expect("test: latest"),
        Some((9, state))
    );
}

pub fn test_rollback_to_height(db: &impl HubStateDatabase) {
    for h in 1..=5 {
        db.put_block_output(h, sample_batch(1), sample_state(1))
            .expect("test: put block output");
    }

    db.rollback_to_height(3).expect("test: rollback");
    let (latest, _) = db
        .get_latest_toplevel_hub_state()
        .expect("test: latest")
        .unwrap();
    assert_eq!(latest, 3);
    assert!(db.get_hub_write_batch(4).expect("test: get wb").is_none());
    assert!(db.get_hub_write_batch(3).expect("test: get wb").is_some());

    let err = db.rollback_to_height(10).unwrap_err();
    assert!(matches!(err, DbError::RevertAboveCurrent(10, 3)));
}

#[macro_export]
macro_rules! hub_state_db_tests {
    ($setup_expr:expr) => {
        #[test]
        fn test_put_and_get_hub_state() {
            let db = $setup_expr;
            $crate::hub_state_tests::test_put_and_get_hub_state(&db);
        }

        #[test]
        fn test_get_latest_hub_state() {
            let db = $setup_expr;
            $crate::hub_state_tests::test_get_latest_hub_state(&db);
        }

        #[test]
        fn test_delete_hub_state() {
            let db = $setup_expr;
            $crate::hub_state_tests::test_delete_hub_state(&db);
        }

        #[test]
        fn test_write_batch_operations() {
            let db = $setup_expr;
            $crate::hub_state_tests::test_write_batch_operations(&db);
        }

        #[test]
        fn test_put_block_output() {
            let db = $setup_expr;
            $crate::hub_state_tests::test_put_block_output(&db);
        }

        #[test]
        fn test_rollback_to_height() {
            let db = $setup_expr;
            $crate::hub_state_tests::test_rollback_to_height(&db);
        }
    };
}
