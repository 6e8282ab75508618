/// Gamepad input using gilrs: the second movement channel.
///
/// D-pad and left stick produce the same four directions as the arrow
/// keys, one step per fresh press. Confirm and cancel buttons come from
/// config.toml via `load_button_config()`. Defaults:
///   D-pad / Left Stick    →  Move
///   Start / A             →  Confirm
///   Select                →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::MoveDir;
use super::input::Intent;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical face/shoulder buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Parse configured button names, skipping unknown ones.
fn parse_buttons(names: &[String]) -> Vec<Btn> {
    names.iter().filter_map(|s| Btn::from_name(s)).collect()
}

struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::Start, Btn::A],
            cancel: vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons freshly pressed since the last update, indexed by `Btn`.
    pressed: [bool; BTN_COUNT],
    /// Directions freshly pressed since the last update, in arrival order.
    moves: Vec<MoveDir>,

    // Stick direction currently past the deadzone, for edge detection.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_dir: Option<MoveDir>,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            pressed: [false; BTN_COUNT],
            moves: Vec::with_capacity(4),
            stick_dir: None,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Empty or unrecognized lists keep
    /// the defaults.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let confirm = parse_buttons(&cfg.confirm);
        if !confirm.is_empty() { self.action_map.confirm = confirm; }
        let cancel = parse_buttons(&cfg.cancel);
        if !cancel.is_empty() { self.action_map.cancel = cancel; }
    }

    pub fn update(&mut self) {
        self.pressed = [false; BTN_COUNT];
        self.moves.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    /// Intents for this frame: moves first, then confirm, then quit.
    pub fn intents(&self) -> Vec<Intent> {
        let mut out: Vec<Intent> = self.moves.iter().map(|&d| Intent::Move(d)).collect();
        if self.any_pressed(&self.action_map.confirm) {
            out.push(Intent::Confirm);
        }
        if self.any_pressed(&self.action_map.cancel) {
            out.push(Intent::Quit);
        }
        out
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                    self.update_stick();
                }
                EventType::Connected => {
                    self.connected = true;
                    log::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_dir = None;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                    log::info!("gamepad disconnected");
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        let dir = match btn {
            Button::DPadUp => Some(MoveDir::Up),
            Button::DPadDown => Some(MoveDir::Down),
            Button::DPadLeft => Some(MoveDir::Left),
            Button::DPadRight => Some(MoveDir::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.moves.push(d);
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.pressed[b.index()] = true;
        }
    }

    /// A stick direction counts once when it first crosses the deadzone.
    #[cfg(feature = "gamepad")]
    fn update_stick(&mut self) {
        let dir = stick_direction(self.stick_x, self.stick_y);
        if dir.is_some() && dir != self.stick_dir {
            self.moves.extend(dir);
        }
        self.stick_dir = dir;
    }

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|b| self.pressed[b.index()])
    }
}

/// Dominant stick axis past the deadzone. gilrs reports Y up as positive.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<MoveDir> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    if x.abs() >= y.abs() {
        Some(if x < 0.0 { MoveDir::Left } else { MoveDir::Right })
    } else {
        Some(if y > 0.0 { MoveDir::Up } else { MoveDir::Down })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_parse_case_insensitively() {
        let names = vec!["start".to_string(), "South".into(), "bogus".into()];
        assert_eq!(parse_buttons(&names), vec![Btn::Start, Btn::A]);
    }

    #[test]
    fn stick_picks_dominant_axis() {
        assert_eq!(stick_direction(0.1, 0.2), None);
        assert_eq!(stick_direction(-0.9, 0.3), Some(MoveDir::Left));
        assert_eq!(stick_direction(0.2, 0.8), Some(MoveDir::Up));
        assert_eq!(stick_direction(0.0, -0.7), Some(MoveDir::Down));
    }

    #[test]
    fn empty_config_keeps_defaults() {
        let mut gp = GamepadState::new();
        gp.load_button_config(&GamepadConfig { confirm: vec![], cancel: vec!["nope".into()] });
        assert_eq!(gp.action_map.confirm, vec![Btn::Start, Btn::A]);
        assert_eq!(gp.action_map.cancel, vec![Btn::Select]);
    }
}
