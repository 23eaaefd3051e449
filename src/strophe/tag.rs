// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Rhyme-group tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rhyme-group label of a verse line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RhymeTag {
    A,
    B,
    C,
    D,
}

impl RhymeTag {
    /// Order in which new lines are tagged
    pub const CYCLE: [RhymeTag; 4] = [RhymeTag::A, RhymeTag::B, RhymeTag::C, RhymeTag::D];

    /// Tag assigned to the line added after `line_count` existing lines
    pub fn for_position(line_count: usize) -> Self {
        Self::CYCLE[line_count % Self::CYCLE.len()]
    }

    /// Next tag in the cycle (D wraps to A)
    pub fn next(self) -> Self {
        Self::for_position(self.index() + 1)
    }

    /// Position in the alphabet (A = 0)
    pub fn index(self) -> usize {
        match self {
            RhymeTag::A => 0,
            RhymeTag::B => 1,
            RhymeTag::C => 2,
            RhymeTag::D => 3,
        }
    }

    /// Label as written in snapshots and on screen
    pub fn as_str(self) -> &'static str {
        match self {
            RhymeTag::A => "A",
            RhymeTag::B => "B",
            RhymeTag::C => "C",
            RhymeTag::D => "D",
        }
    }
}

impl fmt::Display for RhymeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RhymeTag {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RhymeTag::A),
            "B" => Ok(RhymeTag::B),
            "C" => Ok(RhymeTag::C),
            "D" => Ok(RhymeTag::D),
            _ => Err(format!("unknown rhyme tag: {:?}", s)),
        }
    }
}

/// Tags new lines follow, written as letters ("ABAB", "AABB").
///
/// Never empty. Lines past the end of the pattern wrap to its start.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RhymeScheme(Vec<RhymeTag>);

impl RhymeScheme {
    /// Tags in pattern order
    pub fn tags(&self) -> &[RhymeTag] {
        &self.0
    }

    /// Tag for the line added after `line_count` existing lines
    pub fn tag_for(&self, line_count: usize) -> RhymeTag {
        self.0[line_count % self.0.len()]
    }
}

impl fmt::Display for RhymeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.0 {
            f.write_str(tag.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for RhymeScheme {
    type Err = String;

    /// Letters A to D, any case; whitespace between letters is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tags = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_string().parse::<RhymeTag>())
            .collect::<Result<Vec<_>, _>>()?;
        if tags.is_empty() {
            return Err("rhyme scheme needs at least one tag".to_string());
        }
        Ok(Self(tags))
    }
}

impl TryFrom<String> for RhymeScheme {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RhymeScheme> for String {
    fn from(scheme: RhymeScheme) -> Self {
        scheme.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_parse_and_wrap() {
        let scheme: RhymeScheme = "abab".parse().unwrap();
        assert_eq!(scheme.to_string(), "ABAB");
        let tags: Vec<_> = (0..6).map(|n| scheme.tag_for(n)).collect();
        assert_eq!(
            tags,
            vec![RhymeTag::A, RhymeTag::B, RhymeTag::A, RhymeTag::B, RhymeTag::A, RhymeTag::B]
        );

        let scheme: RhymeScheme = "A A B".parse().unwrap();
        assert_eq!(scheme.tags(), &[RhymeTag::A, RhymeTag::A, RhymeTag::B]);
    }

    #[test]
    fn test_scheme_rejects_bad_input() {
        assert!("".parse::<RhymeScheme>().is_err());
        assert!("  ".parse::<RhymeScheme>().is_err());
        assert!("ABE".parse::<RhymeScheme>().is_err());
        assert!(serde_yaml::from_str::<RhymeScheme>("XY").is_err());
        assert_eq!(
            serde_yaml::from_str::<RhymeScheme>("ABBA").unwrap().to_string(),
            "ABBA"
        );
    }

    #[test]
    fn test_cycle_positions() {
        let tags: Vec<_> = (0..9).map(RhymeTag::for_position).collect();
        assert_eq!(
            tags,
            vec![
                RhymeTag::A, RhymeTag::B, RhymeTag::C, RhymeTag::D,
                RhymeTag::A, RhymeTag::B, RhymeTag::C, RhymeTag::D,
                RhymeTag::A,
            ]
        );
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(RhymeTag::A.next(), RhymeTag::B);
        assert_eq!(RhymeTag::D.next(), RhymeTag::A);
    }

    #[test]
    fn test_parse() {
        assert_eq!("b".parse::<RhymeTag>(), Ok(RhymeTag::B));
        assert_eq!(" D ".parse::<RhymeTag>(), Ok(RhymeTag::D));
        assert!("E".parse::<RhymeTag>().is_err());
        assert!("AB".parse::<RhymeTag>().is_err());
    }
}
