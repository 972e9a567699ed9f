//! Application state and event routing.
//!
//! One key event is handled at a time: it is mapped to an [`Action`], applied
//! to the focus state and, where it changes a value, pushed through the
//! gateway. The gateway's answer, not a local guess, becomes the shown value.

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::focus::{Element, Focus, Transition};
use crate::gateway::{DisplayControl, Gateway};
use crate::keymap::{self, Action, Direction};
use crate::params::{KeyOptions, Registry};
use crate::presets::{PresetList, PresetStore};
use crate::ui;

pub struct App<C> {
    registry: Registry,
    presets: PresetStore,
    list: PresetList,
    values: Vec<i32>,
    focus: Focus,
    keys: KeyOptions,
    step: i32,
    gateway: Gateway<C>,
    status: String,
    err: bool,
}

impl<C: DisplayControl> App<C> {
    /// Build the panel and read every parameter's current value once.
    pub fn new(
        registry: Registry,
        presets: PresetStore,
        keys: KeyOptions,
        step: i32,
        control: C,
    ) -> Self {
        let mut gateway = Gateway::new(control);
        let values = registry.iter().map(|p| gateway.get(p)).collect();
        let list = PresetList::new(&presets, &registry);
        let mut app = Self {
            registry,
            presets,
            list,
            values,
            focus: Focus::Unfocused,
            keys,
            step,
            gateway,
            status: String::new(),
            err: false,
        };
        app.status = app.help_status();
        app.collect_failure();
        app
    }

    fn help_status(&self) -> String {
        let shortcuts: Vec<String> = self.registry.iter().map(|p| p.shortcut.to_string()).collect();
        format!(
            "Ready │ {}: select  P: presets  ↑↓←→: adjust  Enter: apply",
            shortcuts.join("/")
        )
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn list(&self) -> &PresetList {
        &self.list
    }

    pub fn keys(&self) -> &KeyOptions {
        &self.keys
    }

    pub fn status(&self) -> (&str, bool) {
        (&self.status, self.err)
    }

    pub fn is_highlighted(&self, el: Element) -> bool {
        self.focus.highlights(el)
    }

    // ─── Event Routing ──────────────────────────────────────────────────────

    pub fn on_key(&mut self, k: KeyEvent) {
        if let Some(action) = keymap::action_for(&k, &self.keys) {
            self.dispatch(action);
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        if self.focus.is_closed() {
            return;
        }
        log::trace!("{action:?} with focus {:?}", self.focus);
        match action {
            Action::Quit => self.transition(Transition::Quit),
            Action::Move(dir) => self.on_move(dir),
            Action::OpenPresets => {
                self.transition(Transition::ActivatePresetList);
                self.set_status("Presets │ ↑↓ choose, Enter apply".into(), false);
            }
            Action::Confirm => {
                self.apply_preset(self.list.selected());
            }
            Action::PresetNumber(n) => {
                self.apply_preset(n);
            }
            Action::Shortcut(c) => self.select_shortcut(c),
        }
        self.collect_failure();
    }

    fn transition(&mut self, t: Transition) {
        let next = self.focus.apply(t);
        if next != self.focus {
            log::debug!("focus {:?} -> {next:?}", self.focus);
        }
        self.focus = next;
    }

    fn on_move(&mut self, dir: Direction) {
        match self.focus {
            Focus::PresetList => {
                if dir.is_decrease() {
                    self.list.scroll_down();
                } else {
                    self.list.scroll_up();
                }
            }
            Focus::Parameter(i) => {
                let Some(param) = self.registry.get(i) else {
                    return;
                };
                let delta = if dir.is_decrease() { -self.step } else { self.step };
                let value = self.gateway.change_by(param, delta);
                let msg = format!("{} → {value}%", param.label);
                self.values[i] = value;
                self.set_status(msg, false);
            }
            Focus::Unfocused | Focus::Closed => {}
        }
    }

    /// Apply preset `number` (1-based). Out-of-range numbers, including the
    /// `<Custom>` row 0, are ignored. Returns whether a preset was applied.
    pub fn apply_preset(&mut self, number: usize) -> bool {
        let Some(preset) = self.presets.by_number(number) else {
            log::debug!("no preset {number}, ignoring");
            return false;
        };
        for (i, (param, &target)) in self.registry.iter().zip(&preset.values).enumerate() {
            self.values[i] = self.gateway.set(param, target);
        }
        let label = match &preset.name {
            Some(name) => format!("{number} ({name})"),
            None => number.to_string(),
        };
        log::info!("applied preset {label}");
        self.set_status(format!("  ✓ Preset {label} applied"), false);
        true
    }

    fn select_shortcut(&mut self, c: char) {
        let Some(i) = self.registry.find_shortcut(c) else {
            return;
        };
        self.transition(Transition::SelectParameter(i));
        let msg = self
            .registry
            .get(i)
            .map(|p| format!("{} │ ↑↓ or ←→ to adjust", p.label))
            .unwrap_or_default();
        self.set_status(msg, false);
    }

    fn set_status(&mut self, msg: String, err: bool) {
        self.status = msg;
        self.err = err;
    }

    fn collect_failure(&mut self) {
        if let Some(msg) = self.gateway.take_failure() {
            self.set_status(format!("  ✗ {msg}"), true);
        }
    }

    // ─── Main Loop ──────────────────────────────────────────────────────────

    /// Block on input until quit. Every event is followed by a redraw, and the
    /// quit event gets a final frame with nothing highlighted.
    pub fn run(mut self, mut term: ratatui::DefaultTerminal) -> Result<()> {
        loop {
            term.draw(|f| ui::draw(f, &self))?;
            if self.focus.is_closed() {
                break;
            }
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press {
                    self.on_key(k);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::{Call, FakeDisplay};
    use crate::gateway::SENTINEL;
    use crate::params::Profile;
    use crossterm::event::{KeyCode, KeyModifiers};

    const KEYS: KeyOptions = KeyOptions {
        vi_keys: true,
        digit_presets: true,
    };

    fn classic(presets: &[&[i32]], display: FakeDisplay) -> App<FakeDisplay> {
        let reg = Registry::for_profile(Profile::Classic, &KEYS).unwrap();
        App::new(reg, PresetStore::from_values(presets), KEYS, 5, display)
    }

    fn panel() -> App<FakeDisplay> {
        classic(
            &[&[30, 40], &[70, 20]],
            FakeDisplay::with(&[("luminance", 50), ("contrast", 50)]),
        )
    }

    fn press(app: &mut App<FakeDisplay>, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn calls_after_startup(app: &App<FakeDisplay>) -> Vec<Call> {
        app.gateway.control().calls[app.registry.len()..].to_vec()
    }

    #[test]
    fn reads_initial_values() {
        let app = panel();
        assert_eq!(app.values(), &[50, 50]);
        assert_eq!(app.focus(), Focus::Unfocused);
    }

    #[test]
    fn status_line_uses_bar_separators() {
        let mut app = panel();
        assert!(app.status().0.starts_with("Ready │ B/C: select"));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.status().0, "Contrast │ ↑↓ or ←→ to adjust");
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.status().0, "Presets │ ↑↓ choose, Enter apply");
    }

    #[test]
    fn failed_startup_read_shows_sentinel() {
        let app = classic(
            &[&[30, 40]],
            FakeDisplay::with(&[("luminance", 50), ("contrast", 60)]).break_key("luminance"),
        );
        assert_eq!(app.values(), &[SENTINEL, 60]);
        let (msg, err) = app.status();
        assert!(err);
        assert!(msg.contains("Brightness get"), "{msg}");
    }

    #[test]
    fn shortcut_then_up_changes_brightness() {
        let mut app = panel();
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.focus(), Focus::Parameter(0));
        assert!(app.is_highlighted(Element::Parameter(0)));
        assert!(!app.is_highlighted(Element::PresetList));

        press(&mut app, KeyCode::Up);
        assert_eq!(
            calls_after_startup(&app),
            vec![Call::Change("luminance".into(), 5)]
        );
        assert_eq!(app.values(), &[55, 50]);
    }

    #[test]
    fn down_and_vi_keys_decrease() {
        let mut app = panel();
        press(&mut app, KeyCode::Char('C'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.values(), &[50, 40]);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.values(), &[50, 45]);
    }

    #[test]
    fn device_clamp_wins_over_local_arithmetic() {
        let mut app = classic(
            &[&[30, 40]],
            FakeDisplay::with(&[("luminance", 98), ("contrast", 50)]),
        );
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.values()[0], 100);
    }

    #[test]
    fn directions_while_unfocused_do_nothing() {
        let mut app = panel();
        for code in [KeyCode::Up, KeyCode::Down, KeyCode::Left, KeyCode::Right] {
            press(&mut app, code);
        }
        assert!(calls_after_startup(&app).is_empty());
        assert_eq!(app.values(), &[50, 50]);
    }

    #[test]
    fn preset_list_scroll_and_enter() {
        let mut app = panel();
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.focus(), Focus::PresetList);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.list().selected(), 2);
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            calls_after_startup(&app),
            vec![
                Call::Set("luminance".into(), 70),
                Call::Set("contrast".into(), 20)
            ]
        );
        assert_eq!(app.values(), &[70, 20]);
    }

    #[test]
    fn scrolling_never_leaves_the_list() {
        let mut app = panel();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.list().selected(), 0);
        for _ in 0..5 {
            press(&mut app, KeyCode::Left);
        }
        assert_eq!(app.list().selected(), app.list().rows().len() - 1);
    }

    #[test]
    fn custom_row_and_out_of_range_numbers_are_ignored() {
        let mut app = panel();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Char('9'));
        assert!(!app.apply_preset(3));
        assert!(calls_after_startup(&app).is_empty());
        assert_eq!(app.values(), &[50, 50]);
    }

    #[test]
    fn digit_keys_are_one_based_and_ignore_focus() {
        let mut app = panel();
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.values(), &[30, 40]);
        assert_eq!(app.focus(), Focus::Parameter(1));
    }

    #[test]
    fn applying_a_preset_twice_is_idempotent() {
        let mut app = panel();
        assert!(app.apply_preset(2));
        let once = app.values().to_vec();
        assert!(app.apply_preset(2));
        assert_eq!(app.values(), once.as_slice());
    }

    #[test]
    fn one_failed_set_does_not_stop_the_rest() {
        let mut app = classic(
            &[&[30, 40]],
            FakeDisplay::with(&[("luminance", 50), ("contrast", 50)]).break_key("luminance"),
        );
        app.dispatch(Action::PresetNumber(1));
        assert_eq!(app.values(), &[SENTINEL, 40]);
        assert!(calls_after_startup(&app).contains(&Call::Set("contrast".into(), 40)));
        assert!(app.status().1);
    }

    #[test]
    fn selecting_a_parameter_leaves_the_preset_list() {
        let mut app = panel();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.focus(), Focus::Parameter(0));
        assert!(!app.is_highlighted(Element::PresetList));
        press(&mut app, KeyCode::Char('c'));
        assert!(!app.is_highlighted(Element::Parameter(0)));
        assert!(app.is_highlighted(Element::Parameter(1)));
    }

    #[test]
    fn unknown_keys_are_no_ops() {
        let mut app = panel();
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus(), Focus::Parameter(0));
        assert!(calls_after_startup(&app).is_empty());
    }

    #[test]
    fn quit_closes_and_clears_highlight() {
        let mut app = panel();
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.focus().is_closed());
        assert!(!app.is_highlighted(Element::Parameter(0)));
        press(&mut app, KeyCode::Char('c'));
        assert!(app.focus().is_closed());
    }

    #[test]
    fn extended_rgb_channel_uses_compensated_set() {
        let reg = Registry::for_profile(Profile::Extended, &KEYS).unwrap();
        let display = FakeDisplay::with(&[("green", 60)]);
        let mut app = App::new(reg, PresetStore::builtin(), KEYS, 5, display);
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Up);
        assert_eq!(
            calls_after_startup(&app),
            vec![Call::Get("green".into()), Call::Set("green".into(), 15)]
        );
        assert_eq!(app.values()[4], 15);
    }
}
