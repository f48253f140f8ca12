#[allow(clippy::upper_case_acronyms)]
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    HELP,
    PWD,
    CWD,
    CDUP,
    PASV,
    LIST,
    RETR,
    STOR,
    NOOP,
    SYST,
    TYPE,
}

impl FtpCommand {
    pub const ALL: [FtpCommand; 14] = [
        FtpCommand::USER,
        FtpCommand::PASS,
        FtpCommand::QUIT,
        FtpCommand::HELP,
        FtpCommand::PWD,
        FtpCommand::CWD,
        FtpCommand::CDUP,
        FtpCommand::PASV,
        FtpCommand::LIST,
        FtpCommand::RETR,
        FtpCommand::STOR,
        FtpCommand::NOOP,
        FtpCommand::SYST,
        FtpCommand::TYPE,
    ];

    pub fn from_verb(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "QUIT" => Some(FtpCommand::QUIT),
            "HELP" => Some(FtpCommand::HELP),
            "PWD" => Some(FtpCommand::PWD),
            "CWD" => Some(FtpCommand::CWD),
            "CDUP" => Some(FtpCommand::CDUP),
            "PASV" => Some(FtpCommand::PASV),
            "LIST" => Some(FtpCommand::LIST),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "NOOP" => Some(FtpCommand::NOOP),
            "SYST" => Some(FtpCommand::SYST),
            "TYPE" => Some(FtpCommand::TYPE),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER",
            FtpCommand::PASS => "PASS",
            FtpCommand::QUIT => "QUIT",
            FtpCommand::HELP => "HELP",
            FtpCommand::PWD => "PWD",
            FtpCommand::CWD => "CWD",
            FtpCommand::CDUP => "CDUP",
            FtpCommand::PASV => "PASV",
            FtpCommand::LIST => "LIST",
            FtpCommand::RETR => "RETR",
            FtpCommand::STOR => "STOR",
            FtpCommand::NOOP => "NOOP",
            FtpCommand::SYST => "SYST",
            FtpCommand::TYPE => "TYPE",
        }
    }

    /// Whether the command is refused with 530 before PASS.
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            FtpCommand::USER | FtpCommand::PASS | FtpCommand::HELP | FtpCommand::QUIT
        )
    }
}

/// A control line split into its verb and argument.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub verb: &'a str,
    pub arg: &'a str,
}

/// Splits a raw control line at the first space.
///
/// The argument keeps inner spaces (file names may contain them) but is
/// trimmed at both ends. Returns `None` for a line that is blank after
/// trimming.
pub fn parse_command_line(line: &str) -> Option<ParsedLine<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (verb, arg) = match line.split_once(' ') {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    Some(ParsedLine { verb, arg })
}
