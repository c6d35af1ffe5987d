//! Recording mock devices for driving the cycle controller on the host.

#![allow(dead_code)]

use horae_core::config::ClockConfig;
use horae_core::layout::{Font, Point, Region, RefreshMode, Rotation};
use horae_core::traits::{
    Battery, Clock, ClockError, Display, DisplayError, InitError, Network, PowerControl,
    PowerError,
};
use horae_core::{BatteryLevel, CycleController, Devices, Timestamp};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rotation(Rotation),
    Clear(bool),
    Text(String, Point),
    Fill(Region, bool),
    Scale(u8),
    Font(Font),
    Commit(RefreshMode),
    BeginBatch,
    EndBatch,
}

#[derive(Default)]
pub struct MockDisplay {
    pub ops: Vec<DrawOp>,
    pub init_result: Option<InitError>,
    pub inits: u32,
}

impl MockDisplay {
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(t, _) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn text_at(&self, text: &str) -> Option<Point> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Text(t, at) if t == text => Some(*at),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// True if every batch closes and none nest
    pub fn batches_balanced(&self) -> bool {
        let mut depth = 0i32;
        for op in &self.ops {
            match op {
                DrawOp::BeginBatch => {
                    depth += 1;
                    if depth > 1 {
                        return false;
                    }
                }
                DrawOp::EndBatch => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }

    /// True if `op` only ever appears inside a batch
    pub fn always_batched(&self, pred: impl Fn(&DrawOp) -> bool) -> bool {
        let mut open = false;
        for op in &self.ops {
            match op {
                DrawOp::BeginBatch => open = true,
                DrawOp::EndBatch => open = false,
                op if pred(op) && !open => return false,
                _ => {}
            }
        }
        true
    }
}

impl Display for MockDisplay {
    fn init(&mut self) -> Result<(), InitError> {
        self.inits += 1;
        self.init_result.map_or(Ok(()), Err)
    }
    fn set_rotation(&mut self, rotation: Rotation) {
        self.ops.push(DrawOp::Rotation(rotation));
    }
    fn clear(&mut self, white: bool) {
        self.ops.push(DrawOp::Clear(white));
    }
    fn draw_text(&mut self, text: &str, at: Point) {
        self.ops.push(DrawOp::Text(text.to_string(), at));
    }
    fn fill_region(&mut self, region: Region, white: bool) {
        self.ops.push(DrawOp::Fill(region, white));
    }
    fn set_text_scale(&mut self, scale: u8) {
        self.ops.push(DrawOp::Scale(scale));
    }
    fn select_font(&mut self, font: Font) {
        self.ops.push(DrawOp::Font(font));
    }
    fn commit(&mut self, mode: RefreshMode) -> Result<(), DisplayError> {
        self.ops.push(DrawOp::Commit(mode));
        Ok(())
    }
    fn begin_batch(&mut self) {
        self.ops.push(DrawOp::BeginBatch);
    }
    fn end_batch(&mut self) {
        self.ops.push(DrawOp::EndBatch);
    }
}

pub struct MockClock {
    pub time: Result<Timestamp, ClockError>,
    pub available: bool,
    pub init_result: Option<InitError>,
    pub inits: u32,
    pub reads: u32,
    pub sets: Vec<Timestamp>,
}

impl MockClock {
    pub fn at(time: Timestamp) -> Self {
        Self {
            time: Ok(time),
            available: true,
            init_result: None,
            inits: 0,
            reads: 0,
            sets: Vec::new(),
        }
    }

    pub fn missing() -> Self {
        Self {
            time: Err(ClockError::Unavailable),
            available: false,
            ..Self::at(Timestamp::default())
        }
    }
}

impl Clock for MockClock {
    fn init(&mut self) -> Result<(), InitError> {
        self.inits += 1;
        self.init_result.map_or(Ok(()), Err)
    }
    fn now(&mut self) -> Result<Timestamp, ClockError> {
        self.reads += 1;
        self.time
    }
    fn set_now(&mut self, time: Timestamp) -> Result<(), ClockError> {
        self.sets.push(time);
        self.time = Ok(time);
        Ok(())
    }
    fn is_available(&self) -> bool {
        self.available
    }
}

pub struct MockBattery {
    pub level: BatteryLevel,
    pub init_result: Option<InitError>,
    pub inits: u32,
}

impl MockBattery {
    pub fn at(level: BatteryLevel) -> Self {
        Self {
            level,
            init_result: None,
            inits: 0,
        }
    }
}

impl Battery for MockBattery {
    fn init(&mut self) -> Result<(), InitError> {
        self.inits += 1;
        self.init_result.map_or(Ok(()), Err)
    }
    fn level(&mut self) -> BatteryLevel {
        self.level
    }
    fn is_charging(&mut self) -> bool {
        false
    }
}

#[derive(Default)]
pub struct MockPower {
    pub init_result: Option<InitError>,
    pub inits: u32,
    pub sleep_result: Option<PowerError>,
    pub sleeps: Vec<u32>,
    pub power_offs: u32,
    pub wake_on_touch: bool,
    pub wake_on_button: bool,
}

impl PowerControl for MockPower {
    fn init(&mut self) -> Result<(), InitError> {
        self.inits += 1;
        self.init_result.map_or(Ok(()), Err)
    }
    fn sleep_for(&mut self, seconds: u32) -> Result<(), PowerError> {
        self.sleeps.push(seconds);
        self.sleep_result.map_or(Ok(()), Err)
    }
    fn power_off(&mut self) -> PowerError {
        // The host never actually loses power
        self.power_offs += 1;
        PowerError::StillPowered
    }
    fn enable_wake_on_touch(&mut self) {
        self.wake_on_touch = true;
    }
    fn enable_wake_on_button(&mut self) {
        self.wake_on_button = true;
    }
}

pub struct MockNetwork {
    pub init_result: Option<InitError>,
    pub inits: u32,
    pub reachable: bool,
    /// Time the mock server hands out, `None` if it never answers
    pub served: Option<Timestamp>,
    pub connects: Vec<(String, String)>,
    pub syncs: Vec<String>,
}

impl MockNetwork {
    pub fn serving(served: Option<Timestamp>) -> Self {
        Self {
            init_result: None,
            inits: 0,
            reachable: true,
            served,
            connects: Vec::new(),
            syncs: Vec::new(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::serving(None)
        }
    }
}

impl Network for MockNetwork {
    fn init(&mut self) -> Result<(), InitError> {
        self.inits += 1;
        self.init_result.map_or(Ok(()), Err)
    }
    fn connect(&mut self, ssid: &str, credential: &str) -> bool {
        self.connects.push((ssid.to_string(), credential.to_string()));
        self.reachable
    }
    fn sync_time<C: Clock>(&mut self, server: &str, clock: &mut C) -> bool {
        self.syncs.push(server.to_string());
        match self.served {
            Some(t) => clock.set_now(t).is_ok(),
            None => false,
        }
    }
}

pub type MockController =
    CycleController<MockDisplay, MockClock, MockBattery, MockPower, MockNetwork>;

pub fn devices(
    clock: MockClock,
    battery: MockBattery,
    network: MockNetwork,
) -> Devices<MockDisplay, MockClock, MockBattery, MockPower, MockNetwork> {
    Devices {
        display: MockDisplay::default(),
        clock,
        battery,
        power: MockPower::default(),
        network,
    }
}

/// Controller with default config, clock at `time`, reachable network
pub fn controller_at(time: Timestamp, battery: BatteryLevel) -> MockController {
    CycleController::new(
        devices(
            MockClock::at(time),
            MockBattery::at(battery),
            MockNetwork::serving(Some(time)),
        ),
        ClockConfig::default(),
    )
}

pub fn hms(hour: u8, minute: u8, second: u8) -> Timestamp {
    Timestamp::new(2024, 3, 9, hour, minute, second)
}
