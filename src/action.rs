use hostop::system::signal::Verb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Navigate(Direction),
    Signal(Verb, i32),
    NextHost,
    PreviousHost,
    EnterFilterMode,
    ExitFilterMode,
    ClearFilter,
    UpdateFilter(String),
    ToggleKernelThreads,
    ToggleHelp,
    CycleSortMode,
    Refresh,
    None,
}
