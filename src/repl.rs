use ytbrief::export::ArtifactKind;

pub const HELP: &str = "\
Commands:
  <link>              summarize a video (same as 'get <link>')
  get <link>          summarize a video
  show                print the current summary again
  save [txt|docx|all] write downloads of the current summary
  clear               clear cached transcripts and reset the session
  help                show this help
  quit                leave (also 'exit' or Ctrl-D)";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Get(String),
    Show,
    /// `None` saves every available format
    Save(Option<ArtifactKind>),
    Clear,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match (word.to_ascii_lowercase().as_str(), rest) {
            ("get", "") => Command::Unknown(line.to_string()),
            ("get", link) => Command::Get(link.to_string()),
            ("show", "") => Command::Show,
            ("save", "" | "all") => Command::Save(None),
            ("save", "txt" | "text") => Command::Save(Some(ArtifactKind::PlainText)),
            ("save", "docx" | "word") => Command::Save(Some(ArtifactKind::Document)),
            ("save", _) => Command::Unknown(line.to_string()),
            ("clear", "") => Command::Clear,
            ("help" | "?", "") => Command::Help,
            ("quit" | "exit", "") => Command::Quit,
            _ => Command::Get(line.to_string()),
        };
        Some(command)
    }
}
