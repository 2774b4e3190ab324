//! corridor: pedestrians cross a hall split by a pillar.
//!
//! Agents enter at the west door one at a time and head for the east door.
//! The pillar hides the exit, so each agent routes over the graph around
//! its north or south side until the exit comes into sight and it walks
//! straight at it.  Locomotion here is a plain constant-speed step towards
//! the walking target; agents leave the sim on arrival.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ped_cognitive::{CognitiveConfig, CognitiveRouting};
use ped_core::{AgentId, AreaId, Bounds, Polygon, SimConfig, Tick, Vec2, VertexId};
use ped_graph::{NavGraph, NavGraphBuilder};
use ped_perception::{Area, PerceptionConfig, Scenario};
use ped_routing::{NavigationTarget, RoutingModel, ShortestPathRouting};
use ped_sim::{Sim, SimBuilder, SimObserver};
use ped_tactical::{Behavior, Motoric, Pedestrian, TacticalConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const WALKING_SPEED:  f64 = 1.34; // m/s
const ARRIVAL_RADIUS: f64 = 0.15;
const SPAWN_EVERY:    u64 = 10;   // ticks between arrivals at the west door

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "corridor", about = "Pedestrians routing around a pillar")]
struct Args {
    /// Number of pedestrians to send through.
    #[arg(long, default_value_t = 20)]
    agents: u32,

    /// Ticks to simulate (0.1 s each).
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Rayon worker threads.  Defaults to one per core.
    #[arg(long)]
    threads: Option<usize>,

    /// Route on a distorted mental map instead of true distances.
    #[arg(long)]
    cognitive: bool,

    /// Familiarity with the hall for `--cognitive`, in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    familiarity: f64,

    /// Extra hops of route look-ahead.
    #[arg(long, default_value_t = 0)]
    deep: u32,

    #[arg(short, long)]
    verbose: bool,
}

// ── World ─────────────────────────────────────────────────────────────────────

/// 30 × 6 hall with a 4 × 2 pillar in the middle.
///
/// ```text
///  y=5        N1 ───── N2
///            /  ┌─────┐  \
///  y=3   W ─    │     │    ─ E
///            \  └─────┘  /
///  y=1        S1 ───── S2
/// ```
fn build_world() -> (Scenario, NavGraph, VertexId) {
    let scenario = Scenario::new(Bounds::new(Vec2::ZERO, Vec2::new(30.0, 6.0)))
        .with_obstacle(Polygon::rectangle(Vec2::new(13.0, 2.0), Vec2::new(17.0, 4.0)))
        .with_origin(Area::new(
            AreaId(0),
            Polygon::rectangle(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)),
        ))
        .with_area(
            Area::new(AreaId(1), Polygon::rectangle(Vec2::new(27.0, 2.0), Vec2::new(29.0, 4.0)))
                .with_point_of_interest(Vec2::new(28.0, 3.0)),
        );

    let mut b = NavGraphBuilder::new();
    let w = b.add_vertex(Vec2::new(2.0, 3.0));
    let n1 = b.add_vertex(Vec2::new(12.0, 5.0));
    let n2 = b.add_vertex(Vec2::new(18.0, 5.0));
    let s1 = b.add_vertex(Vec2::new(12.0, 1.0));
    let s2 = b.add_vertex(Vec2::new(18.0, 1.0));
    let e = b.add_vertex(Vec2::new(28.0, 3.0));
    for (from, to) in [(w, n1), (n1, n2), (n2, e), (w, s1), (s1, s2), (s2, e)] {
        b.add_corridor(from, to);
    }

    (scenario, b.build(), e)
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Summary {
    ticks:        u64,
    spawned:      usize,
    arrived:      usize,
    peak_walking: usize,
    standing:     usize,
}

impl SimObserver for Summary {
    fn on_agent_spawned(&mut self, _tick: Tick, _agent: AgentId) {
        self.spawned += 1;
    }

    fn on_tick_end<E>(&mut self, _tick: Tick, agents: &[Pedestrian<E>]) {
        self.ticks += 1;
        let walking = agents
            .iter()
            .filter(|a| a.state.tactical_state.motoric == Motoric::Walking)
            .count();
        self.peak_walking = self.peak_walking.max(walking);
        self.standing += agents.len() - walking;
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        info!("finished at {final_tick}");
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// Move every walking agent towards its walking target and drop arrivals.
/// Returns how many arrived.
fn walk<R: RoutingModel>(sim: &mut Sim<R>, exit: Vec2) -> Result<usize> {
    let step = WALKING_SPEED * sim.config.time_step_secs;
    let mut arrived = Vec::new();

    for agent in &mut sim.agents {
        let state = &mut agent.state;
        if state.tactical_state.motoric == Motoric::Walking {
            if let Some(target) = state.next_walking_target {
                let d = state.position.distance(target);
                state.position = if d <= step { target } else { state.position.lerp(target, step / d) };
            }
        }
        if state.position.distance(exit) < ARRIVAL_RADIUS {
            arrived.push(state.id);
        }
    }

    for &id in &arrived {
        sim.remove(id)?;
    }
    Ok(arrived.len())
}

fn run<R: RoutingModel>(args: &Args, config: SimConfig, routing: R) -> Result<Summary> {
    let (scenario, graph, exit_vertex) = build_world();
    let exit = Vec2::new(28.0, 3.0);

    let mut sim = SimBuilder::new(config, scenario, graph, routing)
        .perception(PerceptionConfig { accuracy: 0.1, ..PerceptionConfig::default() })
        .tactical(TacticalConfig { deep_node_selection: args.deep, ..TacticalConfig::default() })
        .build()?;

    let mut summary = Summary::default();
    let mut sent = 0;
    while sim.clock.current_tick < sim.config.end_tick() {
        if sent < args.agents && sim.clock.current_tick.0 % SPAWN_EVERY == 0 {
            let y = 2.5 + f64::from(sent % 3) * 0.5;
            sim.spawn(
                Vec2::new(2.0, y),
                Behavior::Routing,
                Some(NavigationTarget::new(exit_vertex, exit)),
            );
            sent += 1;
        }

        sim.step(&mut summary)?;
        summary.arrived += walk(&mut sim, exit)?;
    }
    summary.on_sim_end(sim.clock.current_tick);

    Ok(summary)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = SimConfig {
        time_step_secs: 0.1,
        total_ticks:    args.ticks,
        seed:           args.seed,
        num_threads:    args.threads,
    };
    config.validate()?;

    if let Some(n) = config.num_threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global()?;
    }

    info!(
        "corridor: {} agents, {} ticks, seed {}, {} routing",
        args.agents,
        args.ticks,
        args.seed,
        if args.cognitive { "cognitive" } else { "shortest-path" }
    );

    let summary = if args.cognitive {
        let routing = CognitiveRouting::new(CognitiveConfig {
            familiarity: args.familiarity,
            ..CognitiveConfig::default()
        })?;
        run(&args, config, routing)?
    } else {
        run(&args, config, ShortestPathRouting)?
    };

    println!();
    println!("Ticks simulated:   {}", summary.ticks);
    println!("Pedestrians sent:  {}", summary.spawned);
    println!("Reached the exit:  {}", summary.arrived);
    println!("Peak walking:      {}", summary.peak_walking);
    println!("Standing (agent-ticks): {}", summary.standing);
    Ok(())
}
