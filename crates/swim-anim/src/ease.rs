use serde::{Deserialize, Serialize};
use swim_core::{Result, SwimError};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    Path(EasePath),
}

impl Ease {
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::Path(path) => path.apply(t),
        }
    }
}

/// One cubic Bézier piece of an ease curve: `[p0, c1, c2, p3]` as `(x, y)`.
pub type EaseSegment = [[f64; 2]; 4];

/// Piecewise cubic-Bézier ease curve from (0, 0) to (1, 1), x being time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EasePath {
    segments: Vec<EaseSegment>,
}

impl EasePath {
    /// Parse `M x,y C x1,y1,x2,y2,x,y ...` path data.
    ///
    /// Numbers may be separated by commas or whitespace; each `C` may be
    /// followed by any multiple of six numbers.
    pub fn from_svg(d: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut number = String::new();
        for ch in d.chars() {
            match ch {
                'M' | 'm' | 'C' | 'c' => {
                    flush_number(&mut number, &mut tokens)?;
                    tokens.push(Token::Command(ch.to_ascii_uppercase()));
                }
                ',' | ' ' | '\t' | '\n' | '\r' => flush_number(&mut number, &mut tokens)?,
                '-' if !number.is_empty() && !number.ends_with(|c: char| c == 'e' || c == 'E') => {
                    flush_number(&mut number, &mut tokens)?;
                    number.push(ch);
                }
                _ => number.push(ch),
            }
        }
        flush_number(&mut number, &mut tokens)?;

        let mut iter = tokens.into_iter().peekable();
        if iter.next() != Some(Token::Command('M')) {
            return Err(SwimError::config("ease path must start with M"));
        }
        let mut cursor = [take_number(&mut iter)?, take_number(&mut iter)?];

        let mut segments = Vec::new();
        while let Some(token) = iter.next() {
            if token != Token::Command('C') {
                return Err(SwimError::config(format!("unexpected token {:?} in ease path", token)));
            }
            while matches!(iter.peek(), Some(Token::Number(_))) {
                let mut v = [0.0; 6];
                for slot in &mut v {
                    *slot = take_number(&mut iter)?;
                }
                let end = [v[4], v[5]];
                segments.push([cursor, [v[0], v[1]], [v[2], v[3]], end]);
                cursor = end;
            }
        }

        Self::from_segments(segments)
    }

    pub fn from_segments(segments: Vec<EaseSegment>) -> Result<Self> {
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Err(SwimError::config("ease path has no curve segments"));
        };
        if first[0] != [0.0, 0.0] || last[3] != [1.0, 1.0] {
            return Err(SwimError::config("ease path must run from (0,0) to (1,1)"));
        }
        if segments.windows(2).any(|w| w[1][3][0] < w[0][3][0]) {
            return Err(SwimError::config("ease path must advance in x"));
        }
        Ok(Self { segments })
    }

    /// The swim stroke ease: a quick push off followed by a long glide.
    pub fn swim_stroke() -> Self {
        Self {
            segments: vec![
                [[0.0, 0.0], [0.042, 0.224], [0.268, 0.35], [0.524, 0.528]],
                [[0.524, 0.528], [0.708, 0.656], [0.876, 0.808], [1.0, 1.0]],
            ],
        }
    }

    pub fn segments(&self) -> &[EaseSegment] {
        &self.segments
    }

    pub fn apply(&self, x: f64) -> f64 {
        let seg = self
            .segments
            .iter()
            .find(|s| x <= s[3][0])
            .or(self.segments.last());
        let Some(seg) = seg else {
            return x;
        };

        // x(s) is monotonic on a well-formed ease segment
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            if bezier(seg, 0, mid) < x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        bezier(seg, 1, 0.5 * (lo + hi))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

fn flush_number(number: &mut String, tokens: &mut Vec<Token>) -> Result<()> {
    if number.is_empty() {
        return Ok(());
    }
    let value = number
        .parse::<f64>()
        .map_err(|_| SwimError::config(format!("bad number {:?} in ease path", number)))?;
    tokens.push(Token::Number(value));
    number.clear();
    Ok(())
}

fn take_number(iter: &mut impl Iterator<Item = Token>) -> Result<f64> {
    match iter.next() {
        Some(Token::Number(v)) => Ok(v),
        other => Err(SwimError::config(format!("expected a number in ease path, found {:?}", other))),
    }
}

fn bezier(seg: &EaseSegment, axis: usize, s: f64) -> f64 {
    let k = 1.0 - s;
    seg[0][axis] * k * k * k
        + 3.0 * seg[1][axis] * k * k * s
        + 3.0 * seg[2][axis] * k * s * s
        + seg[3][axis] * s * s * s
}
