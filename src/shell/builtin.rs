use derive_more::{Add, AddAssign, Display};

/// Commands answered from the virtual filesystem instead of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Builtin {
    #[display("pwd")]
    Pwd,
    #[display("cd")]
    Cd,
    #[display("ls")]
    Ls,
    #[display("touch")]
    Touch,
    #[display("wc")]
    Wc,
    #[display("cat")]
    Cat,
    #[display("exit")]
    Exit,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pwd" => Some(Builtin::Pwd),
            "cd" => Some(Builtin::Cd),
            "ls" => Some(Builtin::Ls),
            "touch" => Some(Builtin::Touch),
            "wc" => Some(Builtin::Wc),
            "cat" => Some(Builtin::Cat),
            "exit" => Some(Builtin::Exit),
            _ => None,
        }
    }
}

/// Line, word and byte counts in the order `wc` prints them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Add, AddAssign)]
pub struct WordCount {
    pub lines: usize,
    pub words: usize,
    pub bytes: usize,
}

impl WordCount {
    pub fn of(text: &str) -> Self {
        Self {
            lines: text.matches('\n').count(),
            words: text.split_whitespace().count(),
            bytes: text.len(),
        }
    }

    pub fn render(&self, label: &str) -> String {
        format!("{} {} {} {}", self.lines, self.words, self.bytes, label)
    }
}
