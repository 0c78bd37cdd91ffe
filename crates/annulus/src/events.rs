#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    Tap,
    Ambient(bool),
    ConfigReload,
}
