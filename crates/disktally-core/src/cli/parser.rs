/// Argument tokenizer: turns argv into options and positionals.
///
/// The grammar is the classic getopt-ish one, done by hand so that the
/// resolver controls value consumption per option:
///
/// - `-abc` is the cluster `-a -b -c`, unless the handler for `-a` asks
///   for a value, in which case it receives `bc`.
/// - `--name=value` carries an attached value that must be claimed with
///   [`ArgParser::value`] before the next token is requested.
/// - a bare `--` makes every later argument positional.
use crate::error::UsageError;
use crate::scan::cursor::{os_bytes, os_string};
use std::collections::VecDeque;
use std::ffi::OsString;

/// One item produced by [`ArgParser::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An option name including its dashes, e.g. `-x` or `--exclude`.
    Option(String),
    /// A non-option argument, returned verbatim.
    Positional(OsString),
}

/// Mutable cursor over an immutable argument list.
///
/// Only option names must be valid UTF-8. Values, whether attached or
/// separate, keep their raw bytes.
#[derive(Debug, Default)]
pub struct ArgParser {
    args: VecDeque<OsString>,
    /// Name of the option most recently returned, for error messages.
    last: String,
    /// Unread bytes of a short-option cluster.
    short_rest: Option<Vec<u8>>,
    /// Right-hand side of `--name=value`, not yet claimed.
    attached: Option<OsString>,
    separator_seen: bool,
}

impl ArgParser {
    /// Create a parser over `args`. The program name must already be stripped.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Retrieve the next token, or `None` once argv is exhausted.
    pub fn next(&mut self) -> Result<Option<Token>, UsageError> {
        if self.attached.is_some() {
            return Err(UsageError::UnexpectedValue(self.last.clone()));
        }
        if let Some(rest) = self.short_rest.take() {
            return self.short_option(&rest).map(Some);
        }

        while let Some(arg) = self.args.pop_front() {
            if self.separator_seen || os_bytes(&arg).first() != Some(&b'-') {
                return Ok(Some(Token::Positional(arg)));
            }
            let bytes = os_bytes(&arg);

            match &bytes[..] {
                b"-" => return Err(UsageError::LoneDash),
                b"--" => {
                    self.separator_seen = true;
                    continue;
                }
                _ => {}
            }
            if bytes.starts_with(b"--") {
                let name = match bytes.iter().position(|&b| b == b'=') {
                    Some(eq) => {
                        self.attached = Some(os_string(&bytes[eq + 1..]));
                        &bytes[..eq]
                    }
                    None => &bytes[..],
                };
                self.last = std::str::from_utf8(name)
                    .map_err(|_| non_unicode(name))?
                    .to_string();
                return Ok(Some(Token::Option(self.last.clone())));
            }
            return self.short_option(&bytes[1..]).map(Some);
        }

        Ok(None)
    }

    /// Claim the value for the option most recently returned by [`next`](Self::next).
    ///
    /// Resolution order: rest of a short cluster, then an `=`-attached
    /// value, then the following argument.
    pub fn value(&mut self) -> Result<OsString, UsageError> {
        if let Some(rest) = self.short_rest.take() {
            return Ok(os_string(&rest));
        }
        if let Some(value) = self.attached.take() {
            return Ok(value);
        }
        self.args
            .pop_front()
            .ok_or_else(|| UsageError::MissingValue(self.last.clone()))
    }

    /// Name of the option most recently returned.
    pub fn option(&self) -> &str {
        &self.last
    }

    /// Emit the first flag of `cluster` and stash the remaining bytes.
    fn short_option(&mut self, cluster: &[u8]) -> Result<Token, UsageError> {
        let valid = match std::str::from_utf8(cluster) {
            Ok(s) => s,
            Err(e) => std::str::from_utf8(&cluster[..e.valid_up_to()]).unwrap_or_default(),
        };
        let flag = valid.chars().next().ok_or_else(|| non_unicode(cluster))?;
        let rest = &cluster[flag.len_utf8()..];
        self.short_rest = (!rest.is_empty()).then(|| rest.to_vec());
        self.last = format!("-{flag}");
        Ok(Token::Option(self.last.clone()))
    }
}

fn non_unicode(name: &[u8]) -> UsageError {
    UsageError::NonUnicodeOption(String::from_utf8_lossy(name).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(name: &str) -> Option<Token> {
        Some(Token::Option(name.to_string()))
    }

    fn pos(value: &str) -> Option<Token> {
        Some(Token::Positional(value.into()))
    }

    #[test]
    fn short_cluster_yields_each_flag() {
        let mut p = ArgParser::new(["-abc"]);
        assert_eq!(p.next().unwrap(), opt("-a"));
        assert_eq!(p.next().unwrap(), opt("-b"));
        assert_eq!(p.next().unwrap(), opt("-c"));
        assert_eq!(p.next().unwrap(), None);
    }

    #[test]
    fn short_cluster_remainder_becomes_value() {
        let mut p = ArgParser::new(["-afoo", "dir"]);
        assert_eq!(p.next().unwrap(), opt("-a"));
        assert_eq!(p.value().unwrap(), "foo");
        assert_eq!(p.next().unwrap(), pos("dir"));
    }

    #[test]
    fn short_option_takes_next_argument() {
        let mut p = ArgParser::new(["-o", "out.json", "-x"]);
        assert_eq!(p.next().unwrap(), opt("-o"));
        assert_eq!(p.value().unwrap(), "out.json");
        assert_eq!(p.next().unwrap(), opt("-x"));
    }

    #[test]
    fn long_option_attached_value_claimed_once() {
        let mut p = ArgParser::new(["--color=dark", "next"]);
        assert_eq!(p.next().unwrap(), opt("--color"));
        assert_eq!(p.option(), "--color");
        assert_eq!(p.value().unwrap(), "dark");
        // Second claim falls through to the following argument.
        assert_eq!(p.value().unwrap(), "next");
    }

    #[test]
    fn unclaimed_attached_value_is_rejected() {
        let mut p = ArgParser::new(["--si=yes", "dir"]);
        assert_eq!(p.next().unwrap(), opt("--si"));
        let err = p.next().unwrap_err();
        assert!(matches!(err, UsageError::UnexpectedValue(ref o) if o == "--si"));
        assert_eq!(
            err.to_string(),
            "Option '--si' does not expect an argument."
        );
    }

    #[test]
    fn attached_value_splits_at_first_equals() {
        let mut p = ArgParser::new(["--exclude=a=b"]);
        assert_eq!(p.next().unwrap(), opt("--exclude"));
        assert_eq!(p.value().unwrap(), "a=b");
        assert_eq!(p.next().unwrap(), None);
    }

    #[test]
    fn missing_value_is_reported() {
        let mut p = ArgParser::new(["--exclude"]);
        assert_eq!(p.next().unwrap(), opt("--exclude"));
        let err = p.value().unwrap_err();
        assert_eq!(err.to_string(), "Option '--exclude' requires an argument.");
    }

    #[test]
    fn separator_makes_dashes_positional() {
        let mut p = ArgParser::new(["-x", "--", "-r", "--", "--help"]);
        assert_eq!(p.next().unwrap(), opt("-x"));
        assert_eq!(p.next().unwrap(), pos("-r"));
        assert_eq!(p.next().unwrap(), pos("--"));
        assert_eq!(p.next().unwrap(), pos("--help"));
        assert_eq!(p.next().unwrap(), None);
    }

    #[test]
    fn lone_dash_is_invalid() {
        let mut p = ArgParser::new(["-"]);
        let err = p.next().unwrap_err();
        assert!(matches!(err, UsageError::LoneDash));
        assert_eq!(err.to_string(), "Invalid option '-'.");
    }

    #[test]
    fn empty_argument_is_positional() {
        let mut p = ArgParser::new([""]);
        assert_eq!(p.next().unwrap(), pos(""));
    }

    #[cfg(unix)]
    #[test]
    fn attached_values_keep_raw_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        let raw = |b: &[u8]| OsStr::from_bytes(b).to_os_string();

        let mut p = ArgParser::new([raw(b"-oout\xff.json"), raw(b"--exclude-from=\xff")]);
        assert_eq!(p.next().unwrap(), opt("-o"));
        assert_eq!(p.value().unwrap(), raw(b"out\xff.json"));
        assert_eq!(p.next().unwrap(), opt("--exclude-from"));
        assert_eq!(p.value().unwrap(), raw(b"\xff"));
        assert_eq!(p.next().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_option_name_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut p = ArgParser::new([OsStr::from_bytes(b"--\xffoo=x")]);
        assert!(matches!(p.next().unwrap_err(), UsageError::NonUnicodeOption(_)));
        let mut p = ArgParser::new([OsStr::from_bytes(b"-\xff")]);
        assert!(matches!(p.next().unwrap_err(), UsageError::NonUnicodeOption(_)));
    }

    #[test]
    fn multibyte_short_flag_is_split_on_char_boundary() {
        let mut p = ArgParser::new(["-éx"]);
        assert_eq!(p.next().unwrap(), opt("-é"));
        assert_eq!(p.next().unwrap(), opt("-x"));
    }

    #[test]
    fn lone_dash_after_separator_is_positional() {
        let mut p = ArgParser::new(["--", "-"]);
        assert_eq!(p.next().unwrap(), pos("-"));
    }
}
