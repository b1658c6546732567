//! The top-level game session: owns the table, the frame state and every
//! outward handle (sounds, UI events, network outbox, stats store).

use glam::Vec2;

use crate::ai::planner::{
    choose_colour, choose_foul_decision, choose_placement, plan_shot, Difficulty,
};
use crate::api::config::{NetRole, PlayerKind, SessionConfig};
use crate::api::stats::{JsonStatsStore, PlayerStats, StatsStore};
use crate::api::types::{GameEvent, Side, SoundEvent};
use crate::bridge::net::{NetMessage, Snapshot, SnapshotGate};
use crate::bridge::protocol::{self as wire, ProtocolLayout};
use crate::core::ball::{initial_layout, Ball};
use crate::core::physics::{self, PhysicsEvent, PhysicsParams, Spin};
use crate::core::rng::Rng;
use crate::core::table::TableConfig;
use crate::core::time::FixedTimestep;
use crate::core::trajectory::{predict, Trajectory};
use crate::error::SnookerError;
use crate::input::queue::{Intent, IntentQueue};
use crate::rules::foul::Foul;
use crate::rules::frame::{FoulDecision, Frame, ShotOutcome};
use crate::rules::respawn::validate_cue_placement;
use crate::rules::shot::{detect_push, TurnStatus};
use crate::rules::target::TargetState;

/// A shot in progress.
#[derive(Debug, Clone)]
struct ActiveShot {
    status: TurnStatus,
    elapsed: f32,
}

pub struct SnookerSession<S: StatsStore = JsonStatsStore> {
    config: SessionConfig,
    table: TableConfig,
    params: PhysicsParams,
    balls: Vec<Ball>,
    frame: Frame,
    breaker: Side,
    spin: Spin,
    aim: Option<Vec2>,
    timestep: FixedTimestep,
    shot: Option<ActiveShot>,
    /// Motion flag mirrored from the host when this session is a replica.
    remote_moving: bool,
    intents: IntentQueue,
    physics_events: Vec<PhysicsEvent>,
    sounds: Vec<SoundEvent>,
    events: Vec<GameEvent>,
    outbox: Vec<NetMessage>,
    players: [PlayerKind; 2],
    role: NetRole,
    rng: Rng,
    gate: SnapshotGate,
    seq: u64,
    dirty: bool,
    since_snapshot: f32,
    since_hit_sound: f32,
    ai_wait: f32,
    store: S,
    stats: [PlayerStats; 2],
    status_message: Option<String>,
    last_outcome: Option<ShotOutcome>,
}

impl SnookerSession<JsonStatsStore> {
    /// Session backed by an empty in-memory stats store.
    pub fn local(config: SessionConfig) -> Self {
        Self::new(config, JsonStatsStore::new())
    }
}

impl<S: StatsStore> SnookerSession<S> {
    pub fn new(config: SessionConfig, store: S) -> Self {
        let table = config.table;
        let stats = [0, 1].map(|i| match store.load(&config.names[i]) {
            Ok(stats) => stats,
            Err(e) => {
                log::warn!("Could not load stats for {}: {}", config.names[i], e);
                PlayerStats::default()
            }
        });
        log::info!(
            "Session started: {:?} vs {:?} ({:?})",
            config.players[0],
            config.players[1],
            config.role
        );
        Self {
            table,
            params: config.physics,
            balls: initial_layout(&table),
            frame: Frame::new(Side::One),
            breaker: Side::One,
            spin: Spin::NONE,
            aim: None,
            timestep: FixedTimestep::new(config.fixed_dt, config.max_frame_dt),
            shot: None,
            remote_moving: false,
            intents: IntentQueue::new(),
            physics_events: Vec::with_capacity(64),
            sounds: Vec::new(),
            events: Vec::new(),
            outbox: Vec::new(),
            players: config.players,
            role: config.role,
            rng: Rng::new(config.seed),
            gate: SnapshotGate::new(),
            seq: 0,
            dirty: true,
            since_snapshot: f32::INFINITY,
            since_hit_sound: f32::INFINITY,
            ai_wait: 0.0,
            store,
            stats,
            status_message: None,
            last_outcome: None,
            config,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn table(&self) -> &TableConfig {
        &self.table
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn spin(&self) -> Spin {
        self.spin
    }

    pub fn aim(&self) -> Option<Vec2> {
        self.aim
    }

    pub fn role(&self) -> NetRole {
        self.role
    }

    pub fn player(&self, side: Side) -> PlayerKind {
        self.players[side.index()]
    }

    pub fn stats(&self, side: Side) -> &PlayerStats {
        &self.stats[side.index()]
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn last_outcome(&self) -> Option<&ShotOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_moving(&self) -> bool {
        match self.role {
            NetRole::Client => self.remote_moving,
            _ => self.shot.is_some() || physics::any_moving(&self.balls),
        }
    }

    pub fn ball_in_hand(&self) -> bool {
        self.frame.ball_in_hand
    }

    pub fn nomination_pending(&self) -> bool {
        self.frame.nomination_pending
    }

    pub fn foul_decision_pending(&self) -> bool {
        self.frame.foul_decision.is_some()
    }

    pub fn free_ball_offered(&self) -> bool {
        self.frame
            .foul_decision
            .map_or(false, |p| p.free_ball_offered)
    }

    /// The side sitting at this screen, if any.
    pub fn local_side(&self) -> Option<Side> {
        [Side::One, Side::Two]
            .into_iter()
            .find(|s| self.players[s.index()] == PlayerKind::Human)
    }

    /// Aiming guide for the current aim, while the table is at rest.
    pub fn trajectory(&self) -> Option<Trajectory> {
        if self.is_moving() {
            return None;
        }
        let aim = self.aim?;
        let cue = self.balls.iter().find(|b| b.is_cue() && b.in_play())?;
        Some(predict(cue.pos, aim, &self.balls, &self.table))
    }

    // -- Frame lifecycle ------------------------------------------------------

    /// Rack up a new frame; the other side breaks.
    pub fn new_frame(&mut self) {
        self.breaker = self.breaker.other();
        self.balls = initial_layout(&self.table);
        self.frame = Frame::new(self.breaker);
        self.spin = Spin::NONE;
        self.aim = None;
        self.shot = None;
        self.ai_wait = 0.0;
        self.last_outcome = None;
        self.status_message = None;
        log::info!("New frame, {:?} to break", self.breaker);
        self.push_event(GameEvent::new(GameEvent::TURN, self.breaker.index() as f32, 0.0, 0.0));
        self.broadcast_snapshot();
    }

    /// Replace the ball set (practice positions, replays). Any shot in
    /// progress is abandoned.
    pub fn set_position(&mut self, balls: Vec<Ball>) {
        self.balls = balls;
        self.shot = None;
        self.dirty = true;
    }

    // -- Input ----------------------------------------------------------------

    /// Queue an intent from the local input layer; applied on the next tick.
    pub fn push_intent(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Apply an intent from the local input layer now.
    pub fn submit_local(&mut self, intent: Intent) -> Result<(), SnookerError> {
        let striker = self.frame.striker;
        let actor = match self.role {
            NetRole::Client => self
                .local_side()
                .ok_or(SnookerError::WrongActor { actor: striker })?,
            _ => striker,
        };
        if self.role != NetRole::Client && self.players[actor.index()] != PlayerKind::Human {
            if intent.is_cosmetic() {
                return Ok(());
            }
            return Err(SnookerError::WrongActor { actor: striker });
        }
        self.submit(actor, intent)
    }

    /// Apply an intent on behalf of `actor`. Rejected intents change nothing.
    pub fn submit(&mut self, actor: Side, intent: Intent) -> Result<(), SnookerError> {
        let striker = self.frame.striker;
        if self.role == NetRole::Client {
            if actor != striker && !intent.is_cosmetic() {
                return Err(SnookerError::WrongActor { actor: striker });
            }
            if let Intent::Aim { direction } = intent {
                self.aim = Some(direction.normalize_or_zero());
            }
            self.outbox.push(NetMessage::Intent {
                from: actor,
                intent,
            });
            return Ok(());
        }

        if actor != striker {
            return Err(SnookerError::WrongActor { actor: striker });
        }
        match intent {
            Intent::Aim { direction } => {
                self.aim = Some(direction.normalize_or_zero());
            }
            Intent::Spin { side, top } => {
                if self.is_moving() {
                    return Err(SnookerError::BallsMoving);
                }
                self.spin = Spin::new(side, top);
            }
            Intent::Shoot { direction, power } => self.commit_shot(direction, power)?,
            Intent::PlaceCue { position } => self.place_cue_ball(position)?,
            Intent::Nominate { kind } => self.frame.nominate_colour(kind, &self.balls)?,
            Intent::Decide { decision } => self.decide_foul(decision)?,
        }
        self.dirty = true;
        Ok(())
    }

    fn commit_shot(&mut self, direction: Vec2, power: f32) -> Result<(), SnookerError> {
        if self.is_moving() {
            return Err(SnookerError::BallsMoving);
        }
        self.frame.can_shoot()?;
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return Err(SnookerError::ZeroDirection);
        }
        let cue_idx = self
            .balls
            .iter()
            .position(|b| b.is_cue() && b.in_play())
            .ok_or(SnookerError::NoBallInHand)?;

        let push = detect_push(&self.balls[cue_idx], &self.balls, direction);
        self.balls[cue_idx].vel = self.params.shot_velocity(direction, power);
        self.frame.ball_in_hand = false;
        self.shot = Some(ActiveShot {
            status: TurnStatus::new(push),
            elapsed: 0.0,
        });
        self.aim = None;
        self.status_message = None;

        let striker = self.frame.striker;
        self.stats[striker.index()].shots_played += 1;
        self.save_stats(striker);
        self.push_sound(SoundEvent::CUE_STRIKE);
        log::debug!(
            "{:?} strikes: dir {:?}, power {:.1}, spin {:?}",
            striker,
            direction,
            power,
            self.spin
        );
        Ok(())
    }

    fn place_cue_ball(&mut self, position: Vec2) -> Result<(), SnookerError> {
        if !self.frame.ball_in_hand {
            return Err(SnookerError::NoBallInHand);
        }
        if self.is_moving() {
            return Err(SnookerError::BallsMoving);
        }
        validate_cue_placement(&self.balls, &self.table, position)?;
        if let Some(cue) = self.balls.iter_mut().find(|b| b.is_cue()) {
            cue.pos = position;
            cue.vel = Vec2::ZERO;
            cue.potted = false;
        }
        Ok(())
    }

    fn decide_foul(&mut self, decision: FoulDecision) -> Result<(), SnookerError> {
        let before = self.frame.striker;
        self.frame.decide_foul(decision)?;
        if self.frame.striker != before {
            self.spin = Spin::NONE;
            self.push_event(GameEvent::new(
                GameEvent::TURN,
                self.frame.striker.index() as f32,
                0.0,
                0.0,
            ));
        }
        Ok(())
    }

    // -- Loop -----------------------------------------------------------------

    /// Feed real elapsed time; runs as many fixed ticks as have accumulated.
    /// Returns the number of ticks run.
    pub fn tick(&mut self, frame_dt: f32) -> u32 {
        let steps = self.timestep.accumulate(frame_dt);
        let dt = self.timestep.dt();
        for _ in 0..steps {
            self.fixed_update(dt);
        }
        steps
    }

    /// One fixed tick.
    pub fn fixed_update(&mut self, dt: f32) {
        for intent in self.intents.drain() {
            if let Err(e) = self.submit_local(intent) {
                if e.is_user_input() {
                    log::warn!("Rejected {:?}: {}", intent, e);
                } else {
                    log::error!("Failed to apply {:?}: {}", intent, e);
                }
                self.status_message = Some(e.to_string());
            }
        }
        if self.role == NetRole::Client {
            return;
        }

        self.since_hit_sound += dt;
        self.since_snapshot += dt;

        if self.shot.is_some() {
            self.advance_shot(dt);
        } else if !self.frame.over {
            self.run_ai(dt);
        }

        if self.role == NetRole::Host
            && (self.dirty || self.shot.is_some())
            && self.since_snapshot >= self.config.snapshot_interval
        {
            self.broadcast_snapshot();
        }
    }

    fn advance_shot(&mut self, dt: f32) {
        self.physics_events.clear();
        let moving = physics::step(
            &mut self.balls,
            &self.table,
            &self.params,
            self.spin,
            dt,
            &mut self.physics_events,
        );

        let events = std::mem::take(&mut self.physics_events);
        for event in &events {
            if let Some(shot) = self.shot.as_mut() {
                shot.status.record(event);
            }
            self.sound_for(event);
        }
        self.physics_events = events;

        let Some(shot) = self.shot.as_mut() else {
            return;
        };
        shot.elapsed += dt;
        let mut moving = moving;
        if moving && shot.elapsed >= self.config.max_shot_seconds {
            log::warn!(
                "Shot still moving after {:.1}s - forcing all balls to rest",
                shot.elapsed
            );
            physics::halt_all(&mut self.balls);
            moving = false;
        }
        if !moving {
            self.finish_shot();
        }
    }

    fn finish_shot(&mut self) {
        let Some(shot) = self.shot.take() else {
            return;
        };
        let outcome = self.frame.resolve_shot(&mut self.balls, &self.table, shot.status);
        let striker = outcome.striker;

        if outcome.turn_switched {
            self.spin = Spin::NONE;
        }

        let stats = &mut self.stats[striker.index()];
        if outcome.foul.is_none() {
            stats.balls_potted += outcome.potted.len() as u32;
            stats.record_break(outcome.break_total);
        }
        self.save_stats(striker);

        if let Some(foul) = outcome.foul {
            self.push_sound(SoundEvent::FOUL);
            self.push_event(GameEvent::new(
                GameEvent::FOUL,
                striker.index() as f32,
                outcome.penalty as f32,
                foul.code() as f32,
            ));
            self.status_message = Some(foul_message(foul, outcome.penalty));
        }
        if outcome.points > 0 {
            self.push_event(GameEvent::new(
                GameEvent::SCORE,
                striker.index() as f32,
                outcome.points as f32,
                outcome.break_total as f32,
            ));
        }
        if outcome.turn_switched && !outcome.frame_over {
            self.push_event(GameEvent::new(
                GameEvent::TURN,
                self.frame.striker.index() as f32,
                0.0,
                0.0,
            ));
        }
        if outcome.frame_over {
            self.on_frame_over();
        }

        log::info!(
            "Shot resolved: {:?} scored {}, foul {:?}, score {} - {}",
            striker,
            outcome.points,
            outcome.foul,
            self.frame.scores[0],
            self.frame.scores[1]
        );
        self.last_outcome = Some(outcome);
        self.ai_wait = 0.0;
        self.dirty = true;
        if self.role == NetRole::Host {
            self.broadcast_snapshot();
        }
    }

    fn on_frame_over(&mut self) {
        let winner = self.frame.winner();
        if let Some(side) = winner {
            self.stats[side.index()].frames_won += 1;
            self.save_stats(side);
        }
        self.push_event(GameEvent::new(
            GameEvent::FRAME_OVER,
            winner.map_or(-1.0, |s| s.index() as f32),
            self.frame.scores[0] as f32,
            self.frame.scores[1] as f32,
        ));
        self.status_message = Some(match winner {
            Some(side) => format!("{} wins the frame", self.config.names[side.index()]),
            None => "Frame drawn".to_string(),
        });
    }

    /// One AI action per think period: decide, nominate, place, then shoot.
    fn run_ai(&mut self, dt: f32) {
        let striker = self.frame.striker;
        let PlayerKind::Ai(difficulty) = self.players[striker.index()] else {
            return;
        };
        self.ai_wait += dt;
        if self.ai_wait < self.config.ai_think_seconds {
            return;
        }
        self.ai_wait = 0.0;
        if let Err(e) = self.ai_act(striker, difficulty) {
            log::warn!("AI action rejected: {}", e);
        }
    }

    fn ai_act(&mut self, side: Side, difficulty: Difficulty) -> Result<(), SnookerError> {
        if let Some(pending) = self.frame.foul_decision {
            let decision =
                choose_foul_decision(&self.balls, &self.table, &pending, self.frame.target, difficulty);
            return self.submit(side, Intent::Decide { decision });
        }
        if self.frame.nomination_pending {
            let kind = choose_colour(&self.balls, &self.table).ok_or(SnookerError::NoNominationPending)?;
            return self.submit(side, Intent::Nominate { kind });
        }
        let on = self.frame.on_ball();
        if self.frame.ball_in_hand {
            let position = choose_placement(&self.balls, &self.table, &on);
            if let Err(e) = self.submit(side, Intent::PlaceCue { position }) {
                log::debug!("AI kept cue ball in place: {}", e);
            }
        }
        let plan = plan_shot(&self.balls, &self.table, &on, difficulty, &mut self.rng);
        self.spin = Spin::NONE;
        self.submit(
            side,
            Intent::Shoot {
                direction: plan.direction,
                power: plan.power,
            },
        )
    }

    // -- Networking -----------------------------------------------------------

    /// Current replicated state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            seq: self.seq,
            balls: self.balls.clone(),
            frame: self.frame.clone(),
            spin: self.spin,
            aim: self.aim,
            moving: self.is_moving(),
        }
    }

    fn broadcast_snapshot(&mut self) {
        if self.role != NetRole::Host {
            return;
        }
        self.seq += 1;
        self.outbox.push(NetMessage::Snapshot(self.snapshot()));
        self.since_snapshot = 0.0;
        self.dirty = false;
    }

    /// Handle one message from the peer.
    pub fn receive_message(&mut self, json: &str) -> Result<(), SnookerError> {
        match NetMessage::from_json(json)? {
            NetMessage::Snapshot(snapshot) => {
                if self.role != NetRole::Client {
                    log::warn!("Ignoring snapshot {} on the authority", snapshot.seq);
                    return Ok(());
                }
                self.apply_snapshot(snapshot);
                Ok(())
            }
            NetMessage::Intent { from, intent } => {
                if self.role != NetRole::Host {
                    log::warn!("Ignoring remote intent outside host role");
                    return Ok(());
                }
                if self.players[from.index()] != PlayerKind::Remote {
                    return Err(SnookerError::WrongActor {
                        actor: self.frame.striker,
                    });
                }
                self.submit(from, intent)
            }
            NetMessage::ConnectionStatus { connected, message } => {
                log::info!("Connection status: {} ({})", connected, message);
                self.status_message = Some(message);
                if !connected {
                    self.on_peer_disconnected();
                }
                Ok(())
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        if !self.gate.accept(snapshot.seq) {
            log::debug!("Dropping stale snapshot {}", snapshot.seq);
            return;
        }
        self.balls = snapshot.balls;
        self.frame = snapshot.frame;
        self.spin = snapshot.spin;
        self.aim = snapshot.aim;
        self.remote_moving = snapshot.moving;
        self.timestep.reset();
    }

    /// The peer is gone: carry on locally with the remote seat taken over
    /// by a local human.
    pub fn on_peer_disconnected(&mut self) {
        if self.role == NetRole::Local {
            return;
        }
        log::warn!("Peer disconnected - continuing in local mode");
        if self.role == NetRole::Client {
            // Whatever the host last sent becomes the local truth.
            if self.remote_moving {
                physics::halt_all(&mut self.balls);
            }
            self.remote_moving = false;
        }
        self.role = NetRole::Local;
        for player in self.players.iter_mut() {
            if *player == PlayerKind::Remote {
                *player = PlayerKind::Human;
            }
        }
        self.status_message = Some("Opponent disconnected - playing locally".to_string());
    }

    // -- Outputs --------------------------------------------------------------

    pub fn drain_outbox(&mut self) -> Vec<NetMessage> {
        std::mem::take(&mut self.outbox)
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fill the renderer buffer for this frame. Drains queued sounds and
    /// game events into it.
    pub fn write_buffer(&mut self, layout: &ProtocolLayout, buf: &mut [f32], frame_counter: u64) {
        layout.write_balls(buf, &self.balls);
        let trajectory = self.trajectory();
        let mut flags = layout.write_trajectory(buf, trajectory.as_ref());
        let sounds = self.drain_sounds();
        layout.write_sounds(buf, &sounds);
        let events = self.drain_events();
        layout.write_events(buf, &events);

        let frame = &self.frame;
        for (set, bit) in [
            (self.is_moving(), wire::FLAG_MOVING),
            (frame.ball_in_hand, wire::FLAG_BALL_IN_HAND),
            (frame.nomination_pending, wire::FLAG_NOMINATION_PENDING),
            (frame.foul_decision.is_some(), wire::FLAG_FOUL_DECISION_PENDING),
            (self.free_ball_offered(), wire::FLAG_FREE_BALL_OFFERED),
            (frame.over, wire::FLAG_FRAME_OVER),
        ] {
            if set {
                flags |= bit;
            }
        }

        buf[wire::HEADER_FRAME_COUNTER] = frame_counter as f32;
        buf[wire::HEADER_FLAGS] = flags as f32;
        buf[wire::HEADER_STRIKER] = frame.striker.index() as f32;
        buf[wire::HEADER_SCORE_ONE] = frame.scores[0] as f32;
        buf[wire::HEADER_SCORE_TWO] = frame.scores[1] as f32;
        buf[wire::HEADER_BREAK] = frame.break_score as f32;
        buf[wire::HEADER_TARGET] = target_code(frame);
        buf[wire::HEADER_TABLE_WIDTH] = self.table.width;
        buf[wire::HEADER_TABLE_HEIGHT] = self.table.height;
    }

    fn sound_for(&mut self, event: &PhysicsEvent) {
        match *event {
            PhysicsEvent::Pot { .. } => self.push_sound(SoundEvent::POT),
            PhysicsEvent::Collision { impact, .. } => self.throttled_hit(SoundEvent::BALL_HIT, impact),
            PhysicsEvent::Cushion { impact, .. } => self.throttled_hit(SoundEvent::CUSHION, impact),
        }
    }

    fn throttled_hit(&mut self, sound: SoundEvent, impact: f32) {
        if impact < self.config.min_collision_sound_impact
            || self.since_hit_sound < self.config.collision_sound_interval
        {
            return;
        }
        self.since_hit_sound = 0.0;
        self.push_sound(sound);
    }

    fn push_sound(&mut self, sound: SoundEvent) {
        if self.sounds.len() < self.config.max_sounds {
            self.sounds.push(sound);
        }
    }

    fn push_event(&mut self, event: GameEvent) {
        if self.events.len() < self.config.max_events {
            self.events.push(event);
        }
    }

    fn save_stats(&mut self, side: Side) {
        let name = &self.config.names[side.index()];
        if let Err(e) = self.store.save(name, &self.stats[side.index()]) {
            log::warn!("Could not save stats for {}: {}", name, e);
        }
    }
}

/// Ball-on code for the header: -1 free ball, 0 any colour not yet
/// nominated, otherwise the value of the ball on.
fn target_code(frame: &Frame) -> f32 {
    if frame.free_ball {
        return -1.0;
    }
    match frame.target {
        TargetState::Red => 1.0,
        TargetState::AnyColour => frame.nominated.map_or(0.0, |k| k.value() as f32),
        TargetState::Colour(kind) => kind.value() as f32,
    }
}

fn foul_message(foul: Foul, penalty: u32) -> String {
    format!("Foul: {} ({} points)", foul, penalty)
}
