//! The composed scalar core (SCore).
//!
//! This module wires everything together:
//! 1. **Ownership:** the core owns the scheduler, the port arena, the
//!    register file, the instruction and fetch buffers, the five functional
//!    units, and the writeback wires. Events refer to components through the
//!    [`Node`] handle — no shared pointers, no cycles.
//! 2. **Instruction pipeline:** a 3-stage machine over the generic engine —
//!    fetch/decode, dispatch, writeback. Stage 0 always admits a
//!    bookkeeping stub so the later stages keep firing even when the fetch
//!    stream drains; long-latency results would otherwise never retire.
//! 3. **Lifecycle:** `initialize` validates and schedules first ticks in
//!    dataflow order (core, register file, lanes, BRU, MLU, DVU, LSU,
//!    wires); `reset` returns the machine to its post-construction
//!    observable state without reallocating; `run`/`run_for` drive the
//!    event loop.
//!
//! An instruction's life: fetched into the fetch buffer, decoded and
//! dispatched into a unit input port (scoreboard marked), executed in the
//! unit's pipeline, result carried by the unit's writeback wire, polled by
//! stage 2, written back and retired (scoreboard cleared).

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::common::{Cycle, SimError};
use crate::config::Config;
use crate::fabric::packet::{Packet, Payload};
use crate::fabric::port::PortTable;
use crate::fabric::ticker::Ticker;
use crate::fabric::wire::Wire;
use crate::fabric::DELIVERY_PRIORITY;
use crate::sched::Scheduler;
use crate::stats::SimStats;

use super::arch::RegisterFile;
use super::decode::{decode, OpType};
use super::dispatch::{DenyReason, DispatchController};
use super::ibuffer::InstructionBuffer;
use super::pipeline::{Pipeline, StageLogic};
use super::units::{Bru, Dvu, Intu, Lsu, Mlu};

/// Handle to a ticking component of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// The core's own 3-stage instruction pipeline.
    Core,
    /// The register file (write-commit boundary).
    RegFile,
    /// Integer ALU lane `i`.
    Intu(usize),
    /// The branch unit.
    Bru,
    /// The multiplier.
    Mlu,
    /// The divider.
    Dvu,
    /// The load/store unit.
    Lsu,
    /// Writeback wire `i`.
    Wire(usize),
}

/// Scheduled work: a component tick or a deferred packet delivery.
#[derive(Debug, Clone)]
pub enum Action {
    /// Tick the component.
    Tick(Node),
    /// Write the packet to the port (a connection-latency delivery).
    Deliver {
        /// Destination port.
        port: crate::fabric::port::PortId,
        /// Packet in flight.
        packet: Packet,
    },
}

/// Everything the instruction-pipeline stages touch, split from the
/// scheduler so stage code can borrow it wholesale.
#[derive(Debug)]
struct CoreParts {
    ports: PortTable,
    regfile: RegisterFile,
    ibuffer: InstructionBuffer,
    fetch: VecDeque<(u32, u32)>,
    fetch_depth: usize,
    pc: u32,
    num_lanes: usize,
    dispatch: DispatchController,
    intu: Vec<Intu>,
    bru: Bru,
    mlu: Mlu,
    dvu: Dvu,
    lsu: Lsu,
    /// Writeback wires: one per lane, then BRU, MLU, DVU, LSU.
    wires: Vec<Wire>,
    /// Timestamp of the last result retired from each wire, for dedup.
    last_retired: Vec<Option<Cycle>>,
    stats: SimStats,
}

/// Stage functions of the instruction pipeline (state lives in `CoreParts`).
#[derive(Debug, Default)]
struct CoreStages;

impl CoreStages {
    /// Stage 1: run the dispatch rules over the fetch-buffer front.
    fn dispatch_stage(parts: &mut CoreParts, now: Cycle) {
        parts.dispatch.begin_cycle();
        for lane in 0..parts.num_lanes {
            let Some(&(pc, word)) = parts.fetch.front() else {
                break;
            };
            let inst = decode(pc, word);
            if let Some(reason) = parts.dispatch.check(&inst, lane, &parts.regfile) {
                match reason {
                    DenyReason::RawHazard => parts.stats.deny_raw_hazard += 1,
                    DenyReason::SpecialSlot => parts.stats.deny_special_slot += 1,
                    DenyReason::UnitBusy => parts.stats.deny_unit_busy += 1,
                    DenyReason::PortBusy => parts.stats.deny_port_busy += 1,
                    DenyReason::Invalid => parts.stats.deny_invalid += 1,
                }
                trace!(target: "scsim::score", "deny t={now} lane={lane} pc={pc:#x} {reason:?}");
                break;
            }
            let port = match inst.op_type {
                OpType::Alu => parts.intu[lane].in_port,
                OpType::Bru | OpType::Csr | OpType::Fence => parts.bru.in_port,
                OpType::Mlu => parts.mlu.in_port,
                OpType::Dvu => parts.dvu.in_port,
                OpType::Lsu => parts.lsu.in_port,
                // Invalid never passes `check`.
                OpType::Invalid => break,
            };
            if parts.ports.has_data(port) {
                parts.stats.deny_port_busy += 1;
                trace!(target: "scsim::score", "deny t={now} lane={lane} pc={pc:#x} PortBusy");
                break;
            }
            let packet = parts.dispatch.build_command(&inst, &mut parts.regfile, now);
            parts.ports.write(port, packet);
            let rd = inst.effective_rd();
            if rd != 0 {
                parts.regfile.set_busy(rd as usize);
            }
            parts.dispatch.mark_dispatched(inst.op_type);
            let _ = parts.fetch.pop_front();
            parts.stats.instructions_dispatched += 1;
            debug!(target: "scsim::score", "dispatch t={now} lane={lane} pc={pc:#x} {:?}", inst.op_type);
            // Control flow ends the dispatch group.
            if matches!(inst.op_type, OpType::Bru | OpType::Csr | OpType::Fence) {
                break;
            }
        }
    }

    /// Stage 2: poll the writeback wires and retire fresh results.
    fn writeback_stage(parts: &mut CoreParts, now: Cycle) {
        for i in 0..parts.wires.len() {
            let Some(ts) = parts.wires[i].peek_current().map(|p| p.timestamp) else {
                continue;
            };
            if parts.last_retired[i] == Some(ts) {
                continue;
            }
            let Some(packet) = parts.wires[i].take_current() else {
                continue;
            };
            parts.last_retired[i] = Some(ts);
            let (rd, value, write) = match packet.payload {
                Payload::AluResult { value, rd }
                | Payload::MluResult { value, rd }
                | Payload::DvuResult { value, rd } => (rd, value, rd != 0),
                Payload::MemResponse { data, rd, .. } => (rd, data, rd != 0),
                Payload::BruResult {
                    link_data,
                    rd,
                    link_valid,
                    ..
                } => (rd, link_data, link_valid && rd != 0),
                _ => continue,
            };
            if write {
                parts.regfile.write(rd as usize, value);
            }
            parts.regfile.clear_busy(rd as usize);
            parts.stats.instructions_retired += 1;
            debug!(target: "scsim::score", "retire t={now} wire={i} rd={rd} value={value:#x}");
        }
    }
}

impl StageLogic<CoreParts> for CoreStages {
    fn admit(&mut self, parts: &mut CoreParts, _input: Option<Packet>, now: Cycle) -> Option<Packet> {
        // Stage 0: fetch into the buffer when there is room and a word
        // exists at the PC.
        if parts.fetch.len() < parts.fetch_depth
            && let Some(word) = parts.ibuffer.fetch(parts.pc)
        {
            trace!(target: "scsim::score", "fetch t={now} pc={:#x}", parts.pc);
            parts.fetch.push_back((parts.pc, word));
            parts.pc = parts.pc.wrapping_add(4);
        }
        // Always keep a stub flowing so dispatch and writeback fire every
        // cycle; in-flight results must retire after the fetch stream ends.
        Some(Packet::stub(now))
    }

    fn transform(&mut self, parts: &mut CoreParts, stage: usize, _packet: &mut Packet, now: Cycle) {
        match stage {
            1 => Self::dispatch_stage(parts, now),
            2 => Self::writeback_stage(parts, now),
            _ => {}
        }
    }
}

/// The composed scalar core: scheduler, fabric, units, architectural state.
#[derive(Debug)]
pub struct ScalarCore {
    sched: Scheduler<Action>,
    config: Config,
    /// The 3-stage instruction pipeline (fetch/decode, dispatch, writeback).
    pipeline: Pipeline,
    core_ticker: Ticker,
    parts: CoreParts,
    initialized: bool,
}

impl ScalarCore {
    /// Builds a core over the given scheduler and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] when the configuration fails
    /// validation.
    pub fn new(sched: Scheduler<Action>, config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        let mut ports = PortTable::new();

        let mut intu = Vec::with_capacity(config.core.num_lanes);
        for i in 0..config.core.num_lanes {
            intu.push(Intu::new(
                &format!("intu{i}"),
                config.units.alu_period,
                &mut ports,
            )?);
        }
        let bru = Bru::new("bru", config.units.bru_period, &mut ports)?;
        let mlu = Mlu::new("mlu", config.units.mlu_period, &mut ports)?;
        let dvu = Dvu::new("dvu", config.units.dvu_period, &mut ports)?;
        let lsu = Lsu::new(
            "lsu",
            config.units.lsu_period,
            config.lsu.num_banks,
            config.lsu.bank_capacity,
            config.lsu.bank_latency,
            &mut ports,
        )?;

        let latency = config.fabric.connection_latency;
        let period = config.fabric.wire_period;
        let mut wires = Vec::new();
        for (i, lane) in intu.iter().enumerate() {
            wires.push(Wire::new(
                &format!("wb_intu{i}"),
                lane.out_port,
                None,
                latency,
                period,
            ));
        }
        wires.push(Wire::new("wb_bru", bru.out_port, None, latency, period));
        wires.push(Wire::new("wb_mlu", mlu.out_port, None, latency, period));
        wires.push(Wire::new("wb_dvu", dvu.out_port, None, latency, period));
        wires.push(Wire::new("wb_lsu", lsu.out_port, None, latency, period));
        let last_retired = vec![None; wires.len()];

        let regfile = RegisterFile::new(
            config.core.num_registers,
            config.core.num_read_ports,
            config.core.num_write_ports,
            config.core.regfile_forwarding,
            config.units.regfile_period,
        );

        Ok(Self {
            sched,
            config: config.clone(),
            pipeline: Pipeline::new(1, 3)?,
            core_ticker: Ticker::new(1),
            parts: CoreParts {
                ports,
                regfile,
                ibuffer: InstructionBuffer::new(),
                fetch: VecDeque::with_capacity(config.core.fetch_buffer_depth),
                fetch_depth: config.core.fetch_buffer_depth,
                pc: 0,
                num_lanes: config.core.num_lanes,
                dispatch: DispatchController::new(),
                intu,
                bru,
                mlu,
                dvu,
                lsu,
                wires,
                last_retired,
                stats: SimStats::default(),
            },
            initialized: false,
        })
    }

    /// Schedules every component's first tick, in dataflow order.
    ///
    /// A second call before a reset is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] for a bad configuration and
    /// [`SimError::ScheduleInPast`] when `start_time` is behind a clock
    /// that already advanced.
    pub fn initialize(&mut self) -> Result<(), SimError> {
        if self.initialized {
            return Ok(());
        }
        self.config.validate()?;
        let t0 = self.config.core.start_time;
        let sched = &mut self.sched;
        self.core_ticker.start(sched, t0, Action::Tick(Node::Core))?;
        self.parts
            .regfile
            .ticker
            .start(sched, t0, Action::Tick(Node::RegFile))?;
        for (i, lane) in self.parts.intu.iter_mut().enumerate() {
            lane.ticker.start(sched, t0, Action::Tick(Node::Intu(i)))?;
        }
        self.parts.bru.ticker.start(sched, t0, Action::Tick(Node::Bru))?;
        self.parts.mlu.ticker.start(sched, t0, Action::Tick(Node::Mlu))?;
        self.parts.dvu.ticker.start(sched, t0, Action::Tick(Node::Dvu))?;
        self.parts.lsu.ticker.start(sched, t0, Action::Tick(Node::Lsu))?;
        for (i, wire) in self.parts.wires.iter_mut().enumerate() {
            wire.ticker.start(sched, t0, Action::Tick(Node::Wire(i)))?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Returns the machine to its post-construction observable state:
    /// empty pipelines and buffers, zero registers and statistics, clear
    /// scoreboard, clock at zero. Idempotent; nothing is reallocated.
    pub fn reset(&mut self) {
        self.sched.reset();
        self.pipeline.reset();
        self.core_ticker.reset();
        let parts = &mut self.parts;
        parts.ports.clear_all();
        parts.regfile.reset();
        parts.ibuffer.clear();
        parts.fetch.clear();
        parts.pc = 0;
        parts.dispatch.reset();
        for lane in &mut parts.intu {
            lane.reset();
        }
        parts.bru.reset();
        parts.mlu.reset();
        parts.dvu.reset();
        parts.lsu.reset();
        for wire in &mut parts.wires {
            wire.reset();
        }
        parts.last_retired.fill(None);
        parts.stats = SimStats::default();
        self.initialized = false;
    }

    /// Runs until the queue empties or the next event would pass
    /// `max_time` (events at exactly `max_time` still execute).
    pub fn run(&mut self, max_time: Option<Cycle>) {
        while let Some(event) = self.sched.pop_due(max_time) {
            self.dispatch_event(event.time, event.action);
        }
    }

    /// Executes up to `count` non-cancelled events.
    pub fn run_for(&mut self, count: u64) {
        for _ in 0..count {
            let Some(event) = self.sched.pop_due(None) else {
                break;
            };
            self.dispatch_event(event.time, event.action);
        }
    }

    fn dispatch_event(&mut self, now: Cycle, action: Action) {
        match action {
            Action::Deliver { port, packet } => self.parts.ports.write(port, packet),
            Action::Tick(node) => self.tick_node(now, node),
        }
    }

    fn tick_node(&mut self, now: Cycle, node: Node) {
        match node {
            Node::Core => {
                self.parts.stats.cycles += 1;
                let mut stages = CoreStages;
                let _ = self
                    .pipeline
                    .advance(&mut stages, &mut self.parts, || None, false, now);
                self.core_ticker
                    .advance(&mut self.sched, now, Action::Tick(Node::Core));
            }
            Node::RegFile => {
                self.parts.regfile.tick();
                self.parts
                    .regfile
                    .ticker
                    .advance(&mut self.sched, now, Action::Tick(Node::RegFile));
            }
            Node::Intu(i) => {
                let CoreParts { ports, intu, .. } = &mut self.parts;
                intu[i].tick(now, ports);
                intu[i]
                    .ticker
                    .advance(&mut self.sched, now, Action::Tick(Node::Intu(i)));
            }
            Node::Bru => {
                let CoreParts { ports, bru, .. } = &mut self.parts;
                bru.tick(now, ports);
                bru.ticker
                    .advance(&mut self.sched, now, Action::Tick(Node::Bru));
            }
            Node::Mlu => {
                let CoreParts { ports, mlu, .. } = &mut self.parts;
                mlu.tick(now, ports);
                mlu.ticker
                    .advance(&mut self.sched, now, Action::Tick(Node::Mlu));
            }
            Node::Dvu => {
                let CoreParts { ports, dvu, .. } = &mut self.parts;
                dvu.tick(now, ports);
                dvu.ticker
                    .advance(&mut self.sched, now, Action::Tick(Node::Dvu));
            }
            Node::Lsu => {
                let CoreParts { ports, lsu, .. } = &mut self.parts;
                lsu.tick(now, ports);
                lsu.ticker
                    .advance(&mut self.sched, now, Action::Tick(Node::Lsu));
            }
            Node::Wire(i) => {
                let delivery = {
                    let CoreParts { ports, wires, .. } = &mut self.parts;
                    wires[i].tick(now, ports)
                };
                if let Some(d) = delivery {
                    let _ = self.sched.schedule(
                        d.due,
                        DELIVERY_PRIORITY,
                        Action::Deliver {
                            port: d.port,
                            packet: d.packet,
                        },
                    );
                }
                self.parts.wires[i]
                    .ticker
                    .advance(&mut self.sched, now, Action::Tick(Node::Wire(i)));
            }
        }
    }

    // ── Test affordances and observability ────────────────────────────

    /// Installs an instruction word at the given PC.
    pub fn load_instruction(&mut self, pc: u32, word: u32) {
        self.parts.ibuffer.load(pc, word);
    }

    /// Pushes `(pc, word)` straight into the fetch buffer, bypassing the
    /// instruction buffer. Returns false when the buffer is full.
    pub fn inject(&mut self, pc: u32, word: u32) -> bool {
        if self.parts.fetch.len() >= self.parts.fetch_depth {
            return false;
        }
        self.parts.fetch.push_back((pc, word));
        true
    }

    /// Writes a word of data memory (word-addressed).
    pub fn load_data(&mut self, addr: u32, value: u32) {
        self.parts.lsu.logic.banks.write(addr, value);
    }

    /// Reads a word of data memory (word-addressed).
    pub fn read_data(&self, addr: u32) -> u32 {
        self.parts.lsu.logic.banks.read(addr)
    }

    /// Reads an architectural register directly (no port accounting).
    pub fn read_register(&self, idx: usize) -> u32 {
        self.parts.regfile.peek(idx)
    }

    /// Writes an architectural register directly (no port accounting).
    pub fn write_register(&mut self, idx: usize, value: u32) {
        self.parts.regfile.poke(idx, value);
    }

    /// True iff the scoreboard marks the register busy.
    pub fn register_busy(&self, idx: usize) -> bool {
        self.parts.regfile.is_busy(idx)
    }

    /// Current simulation time.
    pub fn current_time(&self) -> Cycle {
        self.sched.current_time()
    }

    /// Current fetch-buffer occupancy.
    pub fn fetch_buffer_len(&self) -> usize {
        self.parts.fetch.len()
    }

    /// Current program counter.
    pub fn pc(&self) -> u32 {
        self.parts.pc
    }

    /// Borrows the scheduler (pending counts, direct scheduling in tests).
    pub fn scheduler(&self) -> &Scheduler<Action> {
        &self.sched
    }

    /// Mutably borrows the scheduler.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<Action> {
        &mut self.sched
    }

    /// Assembles a statistics snapshot from the core counters and every
    /// component's own counts.
    pub fn stats(&self) -> SimStats {
        let parts = &self.parts;
        let mut stats = parts.stats.clone();
        stats.alu_ops = parts.intu.iter().map(Intu::ops_executed).sum();
        stats.bru_ops = parts.bru.ops_executed();
        stats.mlu_ops = parts.mlu.ops_executed();
        stats.dvu_ops = parts.dvu.ops_executed();
        stats.lsu_loads = parts.lsu.loads();
        stats.lsu_stores = parts.lsu.stores();
        stats.div_by_zero = parts.dvu.div_by_zero_count();
        stats.bank_conflicts = parts.lsu.bank_conflicts();
        stats.lsu_out_of_range = parts.lsu.out_of_range();
        stats.wire_drops = parts.wires.iter().map(Wire::drops).sum();
        stats.regfile_read_overflows = parts.regfile.read_port_overflows();
        stats.regfile_write_overflows = parts.regfile.write_port_overflows();
        stats.pipeline_stalls = self.pipeline.total_stalls()
            + parts.intu.iter().map(|u| u.pipe.total_stalls()).sum::<u64>()
            + parts.bru.pipe.total_stalls()
            + parts.mlu.pipe.total_stalls()
            + parts.dvu.pipe.total_stalls()
            + parts.lsu.pipe.total_stalls();
        stats
    }
}
