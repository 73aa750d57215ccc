use snafu::Snafu;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Echo(Vec<String>),
    Pwd,
    Whoami,
    Help,
    Cd(Option<String>),
    Ls(LsOptions),
    Cat(Vec<String>),
    Touch(Vec<String>),
    Mkdir(Vec<String>),
    Sudo,
    Passwd,
    Unknown(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LsOptions {
    pub all: bool,
    pub long: bool,
    pub target: Option<String>,
}

/// Name and usage of every supported command, in `help` order.
pub const USAGE: &[(&str, &str)] = &[
    ("cat", "cat <file>"),
    ("cd", "cd [dir]"),
    ("echo", "echo <string>"),
    ("help", "help"),
    ("ls", "ls [-a] [-l] [path]"),
    ("mkdir", "mkdir <directory>"),
    ("passwd", "passwd"),
    ("pwd", "pwd"),
    ("sudo", "sudo <command>"),
    ("touch", "touch <file>"),
    ("whoami", "whoami"),
];

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = split_words(line)?.into_iter();
        let Some(name) = words.next() else {
            return Ok(Command::Empty);
        };
        let args: Vec<String> = words.collect();

        let command = match name.as_str() {
            "echo" => Command::Echo(args),
            "pwd" => Command::Pwd,
            "whoami" => Command::Whoami,
            "help" => Command::Help,
            "cd" => Command::Cd(args.into_iter().next()),
            "ls" => Command::Ls(LsOptions::parse(args)?),
            "cat" => Command::Cat(args),
            "touch" => Command::Touch(args),
            "mkdir" => Command::Mkdir(args),
            "sudo" => Command::Sudo,
            "passwd" => Command::Passwd,
            _ => Command::Unknown(name),
        };
        Ok(command)
    }
}

impl LsOptions {
    fn parse(args: Vec<String>) -> Result<Self, CommandError> {
        let mut options = LsOptions::default();
        for arg in args {
            match arg.strip_prefix('-').filter(|flags| !flags.is_empty()) {
                Some(flags) => {
                    for flag in flags.chars() {
                        match flag {
                            'a' => options.all = true,
                            'l' => options.long = true,
                            other => return Err(CommandError::InvalidOption { option: other }),
                        }
                    }
                }
                None if options.target.is_none() => options.target = Some(arg),
                None => {}
            }
        }
        Ok(options)
    }
}

/// Splits a line on whitespace, honouring single quotes, double quotes and
/// backslash escapes so names like `blog 1.md` can be typed.
fn split_words(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                in_word = true;
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum CommandError {
    #[snafu(display("unexpected end of input while looking for matching quote"))]
    UnterminatedQuote,
    #[snafu(display("invalid option -- '{}'", option))]
    InvalidOption { option: char },
}
