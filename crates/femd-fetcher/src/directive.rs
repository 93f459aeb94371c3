//! Parsing one preprocessed script line into a control directive or a
//! pass-through wire command.

use crate::error::{FetcherError, Result};

/// Target selector for `fem I` / `fem 0x<mask>` / `fem *`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FemSelector {
    Index(u8),
    Mask(u32),
    All,
}

impl FemSelector {
    /// Resolve to a card-mask bit-pattern, given how many cards are configured.
    pub fn to_mask(self, card_count: u32) -> u32 {
        match self {
            FemSelector::Index(i) => 1 << i,
            FemSelector::Mask(m) => m,
            FemSelector::All => {
                if card_count >= 32 {
                    u32::MAX
                } else {
                    (1 << card_count) - 1
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskMode {
    Ascii,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Loop { start: u64, end: u64 },
    Next,
    End,
    Exit,
    Sleep(u64),
    Fem(FemSelector),
    Verbose(u8),
    VFlags(u32),
    FOpen(DiskMode),
    FClose,
    Path(String),
    EventBuilder(u8),
    FileChunk(u64),
    CreditsShow,
    CreditsRestore(Option<String>),
    DropCredit,
    DelayCredit(Option<u64>),
    ListPed,
    ListThr,
    Exec(String),
    /// Anything not recognised as a local directive: sent on the wire
    /// as-is (after `$loop` substitution).
    Command(String),
}

pub fn parse_directive(line: &str) -> Result<Directive> {
    let trimmed = line.trim();
    let mut parts = trimmed.split_whitespace();
    let head = parts.next().unwrap_or("");
    let rest: Vec<&str> = parts.collect();

    Ok(match head {
        "LOOP" => parse_loop(&rest)?,
        "NEXT" => Directive::Next,
        "END" => Directive::End,
        "exit" | "quit" => Directive::Exit,
        "sleep" => Directive::Sleep(rest.first().and_then(|s| s.parse().ok()).unwrap_or(0)),
        "fem" => Directive::Fem(parse_fem_selector(rest.first().copied().unwrap_or(""))?),
        "verbose" => Directive::Verbose(rest.first().and_then(|s| s.parse().ok()).unwrap_or(0)),
        "vflags" => Directive::VFlags(parse_hex_or_dec(rest.first().copied().unwrap_or("0"))),
        "fopen" => match rest.first().copied() {
            Some("asc") => Directive::FOpen(DiskMode::Ascii),
            Some("bin") => Directive::FOpen(DiskMode::Binary),
            _ => Directive::FOpen(DiskMode::Binary),
        },
        "fclose" => Directive::FClose,
        "path" => Directive::Path(rest.first().copied().unwrap_or("").to_string()),
        "event_builder" => Directive::EventBuilder(rest.first().and_then(|s| s.parse().ok()).unwrap_or(0)),
        "file_chunk" => Directive::FileChunk(rest.first().and_then(|s| s.parse().ok()).unwrap_or(0)),
        "credits" => match rest.first().copied() {
            Some("show") => Directive::CreditsShow,
            Some("restore") => Directive::CreditsRestore(rest.get(1).map(|s| s.to_string())),
            _ => Directive::CreditsShow,
        },
        "drop" if rest.first().copied() == Some("credit") => Directive::DropCredit,
        "delay" if rest.first().copied() == Some("credit") => {
            Directive::DelayCredit(rest.get(1).and_then(|s| s.parse().ok()))
        }
        "LIST" => match rest.first().copied() {
            Some("ped") => Directive::ListPed,
            Some("thr") => Directive::ListThr,
            other => return Err(FetcherError::MalformedLoop(format!("LIST {:?}", other))),
        },
        "exec" => Directive::Exec(rest.first().copied().unwrap_or("").to_string()),
        _ => Directive::Command(trimmed.to_string()),
    })
}

fn parse_loop(rest: &[&str]) -> Result<Directive> {
    match rest {
        [n] => {
            let n: u64 = n.parse().map_err(|_| FetcherError::MalformedLoop(rest.join(" ")))?;
            Ok(Directive::Loop { start: 0, end: n.saturating_sub(1) })
        }
        [a, "TO", b] => {
            let a: u64 = a.parse().map_err(|_| FetcherError::MalformedLoop(rest.join(" ")))?;
            let b: u64 = b.parse().map_err(|_| FetcherError::MalformedLoop(rest.join(" ")))?;
            Ok(Directive::Loop { start: a, end: b })
        }
        _ => Err(FetcherError::MalformedLoop(rest.join(" "))),
    }
}

fn parse_fem_selector(token: &str) -> Result<FemSelector> {
    if token == "*" {
        return Ok(FemSelector::All);
    }
    if let Some(hex) = token.strip_prefix("0x") {
        let mask = u32::from_str_radix(hex, 16).map_err(|_| FetcherError::MalformedFemSelector(token.to_string()))?;
        return Ok(FemSelector::Mask(mask));
    }
    token.parse::<u8>().map(FemSelector::Index).map_err(|_| FetcherError::MalformedFemSelector(token.to_string()))
}

fn parse_hex_or_dec(token: &str) -> u32 {
    if let Some(hex) = token.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).unwrap_or(0)
    } else {
        token.parse().unwrap_or(0)
    }
}

/// Substitute a 4th or 5th whitespace-separated argument (1-based index 4
/// or 5, i.e. the token at position 3 or 4) equal to the literal `$loop`
/// with `loop_index` rendered as hex, per `spec.md` §4.6.
pub fn substitute_loop_token(text: &str, loop_index: Option<u64>) -> String {
    let Some(idx) = loop_index else { return text.to_string() };
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut out = Vec::with_capacity(tokens.len());
    for (i, tok) in tokens.iter().enumerate() {
        if (i == 3 || i == 4) && *tok == "$loop" {
            out.push(format!("0x{:x}", idx));
        } else {
            out.push(tok.to_string());
        }
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loop_n_as_zero_based_range() {
        assert_eq!(parse_directive("LOOP 5").unwrap(), Directive::Loop { start: 0, end: 4 });
    }

    #[test]
    fn parses_loop_a_to_b() {
        assert_eq!(parse_directive("LOOP 2 TO 9").unwrap(), Directive::Loop { start: 2, end: 9 });
    }

    #[test]
    fn parses_fem_selectors() {
        assert_eq!(parse_directive("fem 3").unwrap(), Directive::Fem(FemSelector::Index(3)));
        assert_eq!(parse_directive("fem 0x0F").unwrap(), Directive::Fem(FemSelector::Mask(0x0F)));
        assert_eq!(parse_directive("fem *").unwrap(), Directive::Fem(FemSelector::All));
    }

    #[test]
    fn fem_all_mask_respects_card_count() {
        assert_eq!(FemSelector::All.to_mask(4), 0b1111);
        assert_eq!(FemSelector::All.to_mask(32), u32::MAX);
    }

    #[test]
    fn unrecognised_line_becomes_a_command() {
        assert_eq!(parse_directive("daq 0x100 B").unwrap(), Directive::Command("daq 0x100 B".to_string()));
    }

    #[test]
    fn loop_token_substitution_only_fires_on_4th_or_5th_argument() {
        assert_eq!(substitute_loop_token("wr 0x10 0x20 $loop", Some(0x7)), "wr 0x10 0x20 0x7");
        assert_eq!(substitute_loop_token("wr $loop 0x20", Some(0x7)), "wr $loop 0x20");
    }
}
