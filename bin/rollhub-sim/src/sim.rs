//! Drives hub blocks through the rollapp pipeline and persists each one.

use std::sync::Arc;

use anyhow::{bail, Context};
use rollhub_config::{FraudConfig, SimConfig};
use rollhub_db_types::traits::HubStateDatabase;
use rollhub_identifiers::HubHeight;
use rollhub_rollapp::{
    invariants::check_all, BlockContext, ExecContext, HubEvent, NoopHooks, RollappKeeper,
};
use rollhub_state_types::{HubParams, HubState, IHubStateAccessor, StateStatus};
use tracing::*;

use crate::{
    sequencers::SimSequencers,
    workload::{sim_rollapp_id, sim_rollapps, Workload},
};

/// Timestamp of the hub's genesis block.
const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

pub(crate) type SimKeeper = RollappKeeper<NoopHooks, SimSequencers>;

/// Running totals over the events of a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct SimStats {
    pub(crate) blocks: u64,
    pub(crate) state_updates: u64,
    pub(crate) finalized: u64,
    pub(crate) hard_forks: u64,
    pub(crate) slashes: u64,
    pub(crate) jails: u64,
    pub(crate) rejected_txs: u64,
}

impl SimStats {
    fn record(&mut self, ev: &HubEvent) {
        match ev {
            HubEvent::StateUpdate { .. } => self.state_updates += 1,
            HubEvent::StatusChange { status, .. } => {
                if *status == StateStatus::Finalized {
                    self.finalized += 1;
                }
            }
            HubEvent::HardFork { .. } => self.hard_forks += 1,
            HubEvent::LivenessSlash { .. } => self.slashes += 1,
            HubEvent::LivenessJail { .. } => self.jails += 1,
        }
    }
}

pub(crate) struct Simulator<D> {
    keeper: SimKeeper,
    db: Arc<D>,
    workload: Workload,
    fraud: Option<FraudConfig>,
    state: HubState,
    next_height: HubHeight,
    stats: SimStats,
}

impl<D: HubStateDatabase> Simulator<D> {
    /// Resumes from the latest state in `db`, or writes a genesis block
    /// registering the synthetic rollapps if it's empty.
    pub(crate) fn open(db: Arc<D>, params: HubParams, sim: &SimConfig) -> anyhow::Result<Self> {
        let keeper = RollappKeeper::new(params, NoopHooks, SimSequencers::default());

        let (state, next_height) = match db.get_latest_toplevel_hub_state()? {
            Some((height, state)) => {
                info!(%height, rollapps = state.rollapp_ids().len(), "resuming from stored state");
                (state, height + 1)
            }
            None => {
                let state = write_genesis(&keeper, db.as_ref(), sim)?;
                (state, 1)
            }
        };

        Ok(Self {
            keeper,
            db,
            workload: Workload::new(sim, next_height),
            fraud: sim.fraud,
            state,
            next_height,
            stats: SimStats::default(),
        })
    }

    pub(crate) fn state(&self) -> &HubState {
        &self.state
    }

    pub(crate) fn next_height(&self) -> HubHeight {
        self.next_height
    }

    pub(crate) fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub(crate) fn keeper(&self) -> &SimKeeper {
        &self.keeper
    }

    /// Drives `n` hub blocks.
    pub(crate) fn run(&mut self, n: u64) -> anyhow::Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// Executes, checks and persists the next hub block.
    pub(crate) fn step(&mut self) -> anyhow::Result<()> {
        let height = self.next_height;
        let block = BlockContext::new(height, block_timestamp(self.keeper.params(), height));

        let Self {
            keeper,
            workload,
            fraud,
            state,
            stats,
            ..
        } = self;
        let fraud = fraud.filter(|f| f.hub_height == height);

        let output = keeper.execute_block(&*state, block, |k, s, ctx| {
            if let Some(fraud) = fraud {
                inject_fraud(k, workload, s, ctx, fraud);
            }
            submit_batches(k, workload, s, ctx, stats);
        });

        let (events, batch) = output.into_parts();
        for ev in &events {
            stats.record(ev);
        }
        state.apply_write_batch(batch.clone());

        let violations = check_all(&*state);
        if !violations.is_empty() {
            for v in &violations {
                error!(%height, route = %v.route(), msg = %v.msg(), "invariant broken");
            }
            bail!("{} invariant(s) broken at hub height {height}", violations.len());
        }

        self.db
            .put_block_output(height, batch, self.state.clone())
            .with_context(|| format!("persisting hub block {height}"))?;

        debug!(%height, events = events.len(), "executed hub block");
        self.stats.blocks += 1;
        self.next_height += 1;
        Ok(())
    }
}

fn block_timestamp(params: &HubParams, height: HubHeight) -> u64 {
    GENESIS_TIMESTAMP + height * params.hub_block_interval_secs
}

fn write_genesis<D: HubStateDatabase>(
    keeper: &SimKeeper,
    db: &D,
    sim: &SimConfig,
) -> anyhow::Result<HubState> {
    let mut state = HubState::new();
    let mut registered = Ok(());
    let block = BlockContext::new(0, block_timestamp(keeper.params(), 0));

    let output = keeper.execute_block(&state, block, |k, s, _ctx| {
        registered = sim_rollapps(sim)
            .into_iter()
            .try_for_each(|rollapp| k.register_rollapp(s, rollapp));
    });
    registered.context("registering synthetic rollapps")?;

    let (_, batch) = output.into_parts();
    state.apply_write_batch(batch.clone());
    db.put_block_output(0, batch, state.clone())
        .context("persisting genesis block")?;

    info!(rollapps = sim.num_rollapps, "wrote genesis block");
    Ok(state)
}

fn submit_batches<S: IHubStateAccessor>(
    keeper: &SimKeeper,
    workload: &mut Workload,
    state: &mut S,
    ctx: &mut ExecContext,
    stats: &mut SimStats,
) {
    let timestamp = ctx.block_context().timestamp();
    for id in state.rollapp_ids() {
        let Some(rollapp) = state.get_rollapp(&id).cloned() else {
            continue;
        };
        if rollapp.is_frozen() || !workload.should_submit() {
            continue;
        }

        let res = workload
            .next_update(state, &rollapp, timestamp)
            .and_then(|update| keeper.update_state(state, ctx, update));
        if let Err(e) = res {
            stats.rejected_txs += 1;
            warn!(rollapp_id = %id, err = %e, "state update rejected");
        }
    }
}

fn inject_fraud<S: IHubStateAccessor>(
    keeper: &SimKeeper,
    workload: &mut Workload,
    state: &mut S,
    ctx: &mut ExecContext,
    fraud: FraudConfig,
) {
    let id = sim_rollapp_id(fraud.rollapp);
    let fraud_height = match workload.fraud_height(state, &id) {
        Ok(Some(h)) => h,
        Ok(None) => {
            warn!(rollapp_id = %id, "no pending state to prove fraud against");
            return;
        }
        Err(e) => {
            warn!(rollapp_id = %id, err = %e, "can't pick fraud height");
            return;
        }
    };

    info!(rollapp_id = %id, %fraud_height, "injecting fraud proof");
    if let Err(e) = keeper.hard_fork(state, ctx, &id, fraud_height) {
        warn!(rollapp_id = %id, %fraud_height, err = %e, "hard fork failed");
    }
}

#[cfg(test)]
mod tests {
    use rollhub_db_types::stubs::StubHubStateDb;

    use super::*;

    fn fast_params() -> HubParams {
        HubParams {
            dispute_period_in_blocks: 5,
            hub_block_interval_secs: 3600,
            liveness_slash_time_no_update_secs: 12 * 3600,
            liveness_slash_interval_secs: 3600,
            liveness_jail_time_secs: 48 * 3600,
        }
    }

    fn sim_config(seed: u64) -> SimConfig {
        SimConfig {
            num_rollapps: 3,
            seed,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_run_finalizes_and_persists() {
        let db = Arc::new(StubHubStateDb::new());
        let mut sim = Simulator::open(db.clone(), fast_params(), &sim_config(1)).unwrap();
        assert_eq!(sim.next_height(), 1);
        assert_eq!(sim.state().rollapp_ids().len(), 3);

        sim.run(60).unwrap();

        let stats = sim.stats();
        assert_eq!(stats.blocks, 60);
        assert!(stats.state_updates > 0);
        assert!(stats.finalized > 0);
        assert!(stats.finalized <= stats.state_updates);
        assert_eq!(stats.rejected_txs, 0);

        let (height, stored) = db.get_latest_toplevel_hub_state().unwrap().unwrap();
        assert_eq!(height, 60);
        assert_eq!(&stored, sim.state());
        assert!(db.get_hub_write_batch(60).unwrap().is_some());
    }

    #[test]
    fn test_resume_continues_from_latest_height() {
        let db = Arc::new(StubHubStateDb::new());
        let mut sim = Simulator::open(db.clone(), fast_params(), &sim_config(2)).unwrap();
        sim.run(20).unwrap();
        let state_at_20 = sim.state().clone();
        drop(sim);

        let mut resumed = Simulator::open(db.clone(), fast_params(), &sim_config(2)).unwrap();
        assert_eq!(resumed.next_height(), 21);
        assert_eq!(resumed.state(), &state_at_20);

        resumed.run(5).unwrap();
        let (height, _) = db.get_latest_toplevel_hub_state().unwrap().unwrap();
        assert_eq!(height, 25);
    }

    #[test]
    fn test_fraud_injection_forks_target_only() {
        let db = Arc::new(StubHubStateDb::new());
        let mut cfg = sim_config(3);
        cfg.submit_percent = 100;
        cfg.fraud = Some(FraudConfig {
            hub_height: 10,
            rollapp: 1,
        });

        let mut sim = Simulator::open(db, fast_params(), &cfg).unwrap();
        sim.run(12).unwrap();

        assert_eq!(sim.stats().hard_forks, 1);
        assert_eq!(sim.stats().rejected_txs, 0);
        assert_eq!(sim.keeper().sequencers().prunes(), 1);

        let forked = sim.state().get_rollapp(&sim_rollapp_id(1)).unwrap();
        assert_eq!(forked.revision_number(), 1);
        let untouched = sim.state().get_rollapp(&sim_rollapp_id(0)).unwrap();
        assert_eq!(untouched.revision_number(), 0);
    }

    #[test]
    fn test_rollapps_without_batches_are_not_slashed() {
        let db = Arc::new(StubHubStateDb::new());
        let mut cfg = sim_config(4);
        cfg.num_rollapps = 1;
        cfg.submit_percent = 0;

        let mut sim = Simulator::open(db, fast_params(), &cfg).unwrap();
        sim.run(60).unwrap();

        assert_eq!(sim.stats().state_updates, 0);
        assert_eq!(sim.stats().slashes, 0);
        assert_eq!(sim.keeper().sequencers().slashes(), 0);
    }

    #[test]
    fn test_rollapp_going_quiet_gets_slashed() {
        let db = Arc::new(StubHubStateDb::new());
        let mut cfg = sim_config(5);
        cfg.num_rollapps = 1;
        cfg.submit_percent = 100;

        let mut sim = Simulator::open(db, fast_params(), &cfg).unwrap();
        sim.run(2).unwrap();

        cfg.submit_percent = 0;
        sim.workload = Workload::new(&cfg, sim.next_height());
        sim.run(20).unwrap();

        let stats = sim.stats();
        assert_eq!(stats.state_updates, 2);
        assert!(stats.slashes > 0);
        assert_eq!(stats.jails, 0);
        assert_eq!(sim.keeper().sequencers().slashes(), stats.slashes);
        assert_eq!(sim.keeper().sequencers().jails(), 0);
    }
}
