// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thumbnail-track parsing.
//!
//! A thumbnail track is a WebVTT file whose cue payloads name sprite atlas
//! regions instead of caption text:
//!
//! ```text
//! WEBVTT
//!
//! 1
//! 00:00:00.000 --> 00:00:01.000
//! _0.jpg#xywh=0,0,300,168
//! ```
//!
//! [`parse_cues`] scans for timing lines and reads the line right after each
//! one as its sprite reference. Anything it cannot use is skipped block by
//! block; parsing never fails as a whole.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::timecode::{leading_uint, parse_timestamp};

const HEADER: &str = "WEBVTT";
const RANGE_DELIMITER: &str = "-->";
const REGION_PREFIX: &str = "xywh=";

/// Pixel rectangle within an atlas image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SpriteRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl SpriteRect {
    /// Creates a rectangle from its origin and extent.
    #[must_use]
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns `true` if the rectangle covers no pixels.
    ///
    /// Cues without a `#xywh=` fragment carry an empty rectangle; drawing one
    /// leaves the target surface cleared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// A timed reference to one atlas region.
#[derive(Clone, Debug, PartialEq)]
pub struct Cue {
    /// Inclusive start, in seconds.
    pub start: f64,
    /// Exclusive end, in seconds.
    pub end: f64,
    /// Resolved atlas image location.
    pub src: String,
    /// Region of the atlas to display.
    pub region: SpriteRect,
}

impl Cue {
    /// Returns `true` if `position` lies in `[start, end)`.
    #[inline]
    #[must_use]
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end
    }

    /// Returns `true` if both cues cover the same time range.
    ///
    /// This is the identity the scheduler uses to suppress redraws.
    #[inline]
    #[must_use]
    pub fn same_range(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// The ordered cues of one thumbnail track.
///
/// Order is file order. Cues are not sorted and overlaps are not resolved:
/// [`find`](Self::find) returns the first match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CueTrack {
    cues: Vec<Cue>,
}

impl CueTrack {
    /// Wraps already-parsed cues.
    #[must_use]
    pub fn new(cues: Vec<Cue>) -> Self {
        Self { cues }
    }

    /// Returns the first cue whose range contains `position`.
    ///
    /// This is a linear scan, which is fine for sprite-preview tracks of a few
    /// hundred cues.
    #[must_use]
    pub fn find(&self, position: f64) -> Option<&Cue> {
        self.cues.iter().find(|cue| cue.contains(position))
    }

    /// Returns the number of cues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Returns `true` if the track holds no cues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Returns the cues in file order.
    #[must_use]
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }
}

/// Parses a thumbnail track fetched from `source_url`.
///
/// Relative image references are resolved against the directory part of
/// `source_url`. Blocks are skipped when the timing line has no following
/// sprite line, when the `#xywh=` fragment is malformed, or when the decoded
/// range is not a valid `start < end` interval.
#[must_use]
pub fn parse_cues(text: &str, source_url: &str) -> CueTrack {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let base = source_url.rfind('/').map_or("", |idx| &source_url[..idx]);
    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();

    let mut cues = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if index == 0 && starts_with_ignore_ascii_case(line, HEADER) {
            continue;
        }
        let Some((start, end)) = line.split_once(RANGE_DELIMITER) else {
            continue;
        };
        let sprite = match lines.get(index + 1) {
            Some(next) if !next.is_empty() => *next,
            _ => continue,
        };
        let start = parse_timestamp(start.trim());
        let end = parse_timestamp(end.trim());
        // Also false when either side is NaN.
        let ordered = start < end;
        if !ordered {
            continue;
        }
        if let Some((src, region)) = parse_sprite_ref(sprite, base) {
            cues.push(Cue {
                start,
                end,
                src,
                region,
            });
        }
    }
    CueTrack::new(cues)
}

/// Splits `<image>[#xywh=x,y,w,h]` into a resolved location and a region.
fn parse_sprite_ref(line: &str, base: &str) -> Option<(String, SpriteRect)> {
    let mut parts = line.split('#');
    let image = parts.next().unwrap_or_default();
    let region = match parts.next() {
        Some(fragment) if fragment.starts_with(REGION_PREFIX) => {
            parse_region(&fragment[REGION_PREFIX.len()..])?
        }
        _ => SpriteRect::default(),
    };
    Some((resolve(image, base), region))
}

fn parse_region(values: &str) -> Option<SpriteRect> {
    let mut fields = values.split(',').map(leading_uint);
    let rect = SpriteRect::new(
        fields.next()??,
        fields.next()??,
        fields.next()??,
        fields.next()??,
    );
    if fields.next().is_some() {
        return None;
    }
    Some(rect)
}

/// References without a `/` are joined to `base`, which is empty when the
/// track URL has no directory part.
fn resolve(image: &str, base: &str) -> String {
    if image.contains('/') {
        String::from(image)
    } else {
        format!("{base}/{image}")
    }
}

fn starts_with_ignore_ascii_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len()
        && line.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
