/// Which prompt, if any, currently owns the keyboard.
#[derive(Clone, Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Search,
    CreateNames(String), // comma-separated names being typed
}
