//! Geometric refinement of the coarse classifier output.
//!
//! The 8-way classifier confuses visually similar hand shapes; this module
//! resolves its top-2 class pair into a single letter using landmark
//! geometry. The cascade is an ordered table of rules, each gated on the
//! current (ch1, ch2) pair and a geometric predicate over the crop-local
//! landmark points. The pair is recomputed from the current ch1 before every
//! rule, so a firing rule redirects which later rules can match. Rule order
//! and every pixel threshold are load-bearing.
//!
//! Pure function of its inputs; landmark coordinates are the crop-local
//! points produced by the skeleton renderer.

use asl_models::{distance, Point, LANDMARK_COUNT};

use crate::classifier::COARSE_CLASSES;
use crate::error::{InferenceError, InferenceResult};

/// One cascade step: when the current class pair is in `pairs` and `holds`
/// is true over the landmark points, ch1 is reassigned to `bucket`.
struct Rule {
    pairs: &'static [(usize, usize)],
    holds: fn(&[Point]) -> bool,
    bucket: usize,
}

#[inline]
fn d(p: &[Point], a: usize, b: usize) -> f64 {
    distance(p[a], p[b])
}

/// The ordered disambiguation cascade. Image coordinates grow downward, so
/// `p[6].y > p[8].y` means the index fingertip sits above its middle joint
/// (finger extended) and `<` means curled.
static CASCADE: &[Rule] = &[
    // all-fingers-curled shapes vs. everything else -> fist group
    Rule {
        pairs: &[
            (5, 2),
            (5, 3),
            (3, 5),
            (3, 6),
            (3, 0),
            (3, 2),
            (6, 4),
            (6, 1),
            (6, 2),
            (6, 6),
            (6, 7),
            (6, 0),
            (6, 5),
            (4, 1),
            (1, 0),
            (1, 1),
            (6, 3),
            (1, 6),
            (5, 6),
            (5, 1),
            (4, 5),
            (1, 4),
            (1, 5),
            (2, 0),
            (2, 6),
            (4, 6),
            (5, 7),
            (7, 6),
            (2, 5),
            (7, 1),
            (5, 4),
            (7, 0),
            (7, 5),
            (7, 2),
        ],
        holds: |p| {
            p[6].y < p[8].y && p[10].y < p[12].y && p[14].y < p[16].y && p[18].y < p[20].y
        },
        bucket: 0,
    },
    // O vs S: thumb crossing in front of the index base
    Rule {
        pairs: &[(2, 2), (2, 1)],
        holds: |p| p[5].x < p[4].x,
        bucket: 0,
    },
    // curled shapes with the wrist right of every tip -> C/O group
    Rule {
        pairs: &[
            (0, 0),
            (0, 6),
            (0, 2),
            (0, 5),
            (0, 1),
            (0, 7),
            (5, 2),
            (7, 6),
            (7, 1),
        ],
        holds: |p| {
            (p[0].x > p[8].x
                && p[0].x > p[4].x
                && p[0].x > p[12].x
                && p[0].x > p[16].x
                && p[0].x > p[20].x)
                && p[5].x > p[4].x
        },
        bucket: 2,
    },
    // narrow index-to-ring spread -> C/O group
    Rule {
        pairs: &[(6, 0), (6, 6), (6, 2)],
        holds: |p| d(p, 8, 16) < 52.0,
        bucket: 2,
    },
    // pointing sideways with curled index -> G/H group
    Rule {
        pairs: &[(1, 4), (1, 5), (1, 6), (1, 3), (1, 0)],
        holds: |p| {
            p[6].y > p[8].y
                && p[14].y < p[16].y
                && p[18].y < p[20].y
                && p[0].x < p[8].x
                && p[0].x < p[12].x
                && p[0].x < p[16].x
                && p[0].x < p[20].x
        },
        bucket: 3,
    },
    // thumb right of wrist -> G/H group
    Rule {
        pairs: &[(4, 6), (4, 1), (4, 5), (4, 3), (4, 7)],
        holds: |p| p[4].x > p[0].x,
        bucket: 3,
    },
    // thumb knuckle well above the ring tip -> G/H group
    Rule {
        pairs: &[(5, 3), (5, 0), (5, 7), (5, 4), (5, 2), (5, 1), (5, 5)],
        holds: |p| p[2].y + 15 < p[16].y,
        bucket: 3,
    },
    // wide thumb-to-middle gap -> L
    Rule {
        pairs: &[(6, 4), (6, 1), (6, 2)],
        holds: |p| d(p, 4, 11) > 55.0,
        bucket: 4,
    },
    // L vs D: wide thumb gap with only the index curled over
    Rule {
        pairs: &[(1, 4), (1, 6), (1, 1)],
        holds: |p| {
            d(p, 4, 11) > 50.0
                && (p[6].y > p[8].y
                    && p[10].y < p[12].y
                    && p[14].y < p[16].y
                    && p[18].y < p[20].y)
        },
        bucket: 4,
    },
    // thumb left of wrist -> L
    Rule {
        pairs: &[(3, 6), (3, 4)],
        holds: |p| p[4].x < p[0].x,
        bucket: 4,
    },
    // thumb base left of middle tip -> L
    Rule {
        pairs: &[(2, 2), (2, 5), (2, 4)],
        holds: |p| p[1].x < p[12].x,
        bucket: 4,
    },
    // index-down shapes with the thumb under the middle joint -> P/Q/Z group
    Rule {
        pairs: &[(3, 6), (3, 5), (3, 4)],
        holds: |p| {
            (p[6].y > p[8].y && p[10].y < p[12].y && p[14].y < p[16].y && p[18].y < p[20].y)
                && p[4].y > p[10].y
        },
        bucket: 5,
    },
    // thumb level with all fingertips -> P/Q/Z group
    Rule {
        pairs: &[(3, 2), (3, 1), (3, 6)],
        holds: |p| {
            p[4].y + 17 > p[8].y
                && p[4].y + 17 > p[12].y
                && p[4].y + 17 > p[16].y
                && p[4].y + 17 > p[20].y
        },
        bucket: 5,
    },
    // thumb right of wrist -> P/Q/Z group
    Rule {
        pairs: &[(4, 4), (4, 5), (4, 2), (7, 5), (7, 6), (7, 0)],
        holds: |p| p[4].x > p[0].x,
        bucket: 5,
    },
    // wrist left of every tip -> P/Q/Z group
    Rule {
        pairs: &[
            (0, 2),
            (0, 6),
            (0, 1),
            (0, 5),
            (0, 0),
            (0, 7),
            (0, 4),
            (0, 3),
            (2, 7),
        ],
        holds: |p| {
            p[0].x < p[8].x && p[0].x < p[12].x && p[0].x < p[16].x && p[0].x < p[20].x
        },
        bucket: 5,
    },
    // thumb joint left of wrist -> Y/J group
    Rule {
        pairs: &[(5, 7), (5, 2), (5, 6)],
        holds: |p| p[3].x < p[0].x,
        bucket: 7,
    },
    // curled index -> Y/J group
    Rule {
        pairs: &[(4, 6), (4, 2), (4, 4), (4, 1), (4, 5), (4, 7)],
        holds: |p| p[6].y < p[8].y,
        bucket: 7,
    },
    // pinky extended -> Y/J group
    Rule {
        pairs: &[
            (6, 7),
            (0, 7),
            (0, 1),
            (0, 0),
            (6, 4),
            (6, 6),
            (6, 5),
            (6, 1),
        ],
        holds: |p| p[18].y > p[20].y,
        bucket: 7,
    },
    // index base right of ring tip -> X
    Rule {
        pairs: &[(0, 4), (0, 2), (0, 3), (0, 1), (0, 6)],
        holds: |p| p[5].x > p[16].x,
        bucket: 6,
    },
    // curled pinky with hooked index -> X
    Rule {
        pairs: &[(7, 2)],
        holds: |p| p[18].y < p[20].y && p[8].y < p[10].y,
        bucket: 6,
    },
    // wide index-to-ring spread -> X
    Rule {
        pairs: &[(2, 1), (2, 2), (2, 6), (2, 7), (2, 0)],
        holds: |p| d(p, 8, 16) > 50.0,
        bucket: 6,
    },
    // narrow thumb-to-middle gap -> X
    Rule {
        pairs: &[(4, 6), (4, 2), (4, 1), (4, 4)],
        holds: |p| d(p, 4, 11) < 60.0,
        bucket: 6,
    },
    // thumb tucked well left of the index base -> X
    Rule {
        pairs: &[(1, 4), (1, 6), (1, 0), (1, 2)],
        holds: |p| p[5].x - p[4].x - 15 > 0,
        bucket: 6,
    },
    // all fingers extended -> B/D/F group
    Rule {
        pairs: &[
            (5, 0),
            (5, 1),
            (5, 4),
            (5, 5),
            (5, 6),
            (6, 1),
            (7, 6),
            (0, 2),
            (7, 1),
            (7, 4),
            (6, 6),
            (7, 2),
            (6, 3),
            (6, 4),
            (7, 5),
        ],
        holds: |p| {
            p[6].y > p[8].y && p[10].y > p[12].y && p[14].y > p[16].y && p[18].y > p[20].y
        },
        bucket: 1,
    },
    // index curled, rest extended -> F
    Rule {
        pairs: &[
            (6, 1),
            (6, 0),
            (0, 3),
            (6, 4),
            (2, 2),
            (0, 6),
            (6, 2),
            (7, 6),
            (4, 6),
            (4, 1),
            (4, 2),
            (0, 2),
            (7, 1),
            (7, 4),
            (6, 6),
            (7, 2),
            (7, 5),
        ],
        holds: |p| {
            p[6].y < p[8].y && p[10].y > p[12].y && p[14].y > p[16].y && p[18].y > p[20].y
        },
        bucket: 1,
    },
    // middle/ring/pinky extended -> B/D/F group
    Rule {
        pairs: &[(6, 1), (6, 0), (4, 2), (4, 1), (4, 6), (4, 4)],
        holds: |p| {
            p[10].y > p[12].y && p[14].y > p[16].y && p[18].y > p[20].y
        },
        bucket: 1,
    },
    // index up, rest curled, thumb low -> D
    Rule {
        pairs: &[
            (5, 0),
            (3, 4),
            (3, 0),
            (3, 1),
            (3, 5),
            (5, 5),
            (5, 4),
            (5, 1),
            (7, 6),
        ],
        holds: |p| {
            (p[6].y > p[8].y && p[10].y < p[12].y && p[14].y < p[16].y && p[18].y < p[20].y)
                && (p[2].x < p[0].x)
                && p[4].y > p[14].y
        },
        bucket: 1,
    },
    // narrow thumb gap with index up -> D
    Rule {
        pairs: &[(4, 1), (4, 2), (4, 4)],
        holds: |p| {
            d(p, 4, 11) < 50.0
                && (p[6].y > p[8].y
                    && p[10].y < p[12].y
                    && p[14].y < p[16].y
                    && p[18].y < p[20].y)
        },
        bucket: 1,
    },
    // index up, rest curled, thumb high -> D
    Rule {
        pairs: &[(3, 4), (3, 0), (3, 1), (3, 5), (3, 6)],
        holds: |p| {
            (p[6].y > p[8].y && p[10].y < p[12].y && p[14].y < p[16].y && p[18].y < p[20].y)
                && (p[2].x < p[0].x)
                && p[14].y < p[4].y
        },
        bucket: 1,
    },
    // thumb not tucked behind the index base -> B/D/F group
    Rule {
        pairs: &[(6, 6), (6, 4), (6, 1), (6, 2)],
        holds: |p| p[5].x - p[4].x - 15 < 0,
        bucket: 1,
    },
    // pinky curled, rest extended -> I
    Rule {
        pairs: &[
            (5, 4),
            (5, 5),
            (5, 1),
            (0, 3),
            (0, 7),
            (5, 0),
            (0, 2),
            (6, 2),
            (7, 5),
            (7, 1),
            (7, 6),
            (7, 7),
        ],
        holds: |p| {
            p[6].y < p[8].y && p[10].y < p[12].y && p[14].y < p[16].y && p[18].y > p[20].y
        },
        bucket: 1,
    },
    // I-shape with the thumb near the index base -> Y/J group
    Rule {
        pairs: &[(1, 5), (1, 7), (1, 1), (1, 6), (1, 3), (1, 0)],
        holds: |p| {
            (p[4].x < p[5].x + 15)
                && (p[6].y < p[8].y
                    && p[10].y < p[12].y
                    && p[14].y < p[16].y
                    && p[18].y > p[20].y)
        },
        bucket: 7,
    },
    // index+middle extended with thumb low -> U/V/R group
    Rule {
        pairs: &[
            (5, 5),
            (5, 0),
            (5, 4),
            (5, 1),
            (4, 6),
            (4, 1),
            (7, 6),
            (3, 0),
            (3, 5),
        ],
        holds: |p| {
            (p[6].y > p[8].y && p[10].y > p[12].y && p[14].y < p[16].y && p[18].y < p[20].y)
                && p[4].y > p[14].y
        },
        bucket: 1,
    },
    // upright hand with a narrow thumb gap -> W
    Rule {
        pairs: &[
            (3, 5),
            (3, 0),
            (3, 6),
            (5, 1),
            (4, 1),
            (2, 0),
            (5, 0),
            (5, 5),
        ],
        holds: |p| {
            let fg = 13;
            !(p[0].x + fg < p[8].x
                && p[0].x + fg < p[12].x
                && p[0].x + fg < p[16].x
                && p[0].x + fg < p[20].x)
                && !(p[0].x > p[8].x
                    && p[0].x > p[12].x
                    && p[0].x > p[16].x
                    && p[0].x > p[20].x)
                && d(p, 4, 11) < 50.0
        },
        bucket: 1,
    },
    // index/middle/ring extended -> W
    Rule {
        pairs: &[(5, 0), (5, 5), (0, 1)],
        holds: |p| p[6].y > p[8].y && p[10].y > p[12].y && p[14].y > p[16].y,
        bucket: 1,
    },
];

/// Refine the raw class probabilities into a letter.
///
/// Deterministic and side-effect-free: the same probabilities and points
/// always yield the same letter.
pub fn refine(probs: &[f32; COARSE_CLASSES], points: &[Point]) -> InferenceResult<char> {
    if points.len() < LANDMARK_COUNT {
        return Err(InferenceError::InsufficientLandmarks { got: points.len() });
    }

    let (mut ch1, ch2) = top_two(probs);

    for rule in CASCADE {
        if rule.pairs.contains(&(ch1, ch2)) && (rule.holds)(points) {
            ch1 = rule.bucket;
        }
    }

    letter_for_bucket(ch1, points)
}

/// Top-2 class indices by descending probability; ties keep the lower index.
fn top_two(probs: &[f32; COARSE_CLASSES]) -> (usize, usize) {
    let mut scratch = *probs;
    let ch1 = argmax(&scratch);
    scratch[ch1] = 0.0;
    let ch2 = argmax(&scratch);
    (ch1, ch2)
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Map the final bucket to a letter via per-bucket geometry sub-rules.
fn letter_for_bucket(bucket: usize, p: &[Point]) -> InferenceResult<char> {
    let letter = match bucket {
        0 => fist_letter(p),
        1 => return extended_letter(p),
        2 => {
            if d(p, 12, 4) > 42.0 {
                'C'
            } else {
                'O'
            }
        }
        3 => {
            if d(p, 8, 12) > 72.0 {
                'G'
            } else {
                'H'
            }
        }
        4 => 'L',
        5 => {
            if p[4].x > p[12].x && p[4].x > p[16].x && p[4].x > p[20].x {
                if p[8].y < p[5].y {
                    'Z'
                } else {
                    'Q'
                }
            } else {
                'P'
            }
        }
        6 => 'X',
        7 => {
            if d(p, 8, 4) > 42.0 {
                'Y'
            } else {
                'J'
            }
        }
        other => return Err(InferenceError::Unclassified { bucket: other }),
    };
    Ok(letter)
}

/// Fist-group decision tree: first matching branch wins, defaulting to S.
fn fist_letter(p: &[Point]) -> char {
    if p[4].x < p[6].x && p[4].x < p[10].x && p[4].x < p[14].x && p[4].x < p[18].x {
        'A'
    } else if p[4].x > p[6].x
        && p[4].x < p[10].x
        && p[4].x < p[14].x
        && p[4].x < p[18].x
        && p[4].y < p[14].y
        && p[4].y < p[18].y
    {
        'T'
    } else if p[4].y > p[8].y && p[4].y > p[12].y && p[4].y > p[16].y && p[4].y > p[20].y {
        'E'
    } else if p[4].x > p[6].x && p[4].x > p[10].x && p[4].x > p[14].x && p[4].y < p[18].y {
        'M'
    } else if p[4].x > p[6].x && p[4].x > p[10].x && p[4].y < p[18].y && p[4].y < p[14].y {
        'N'
    } else {
        'S'
    }
}

/// Extended-finger group: every matching assignment overwrites the previous
/// one, so the last matching sub-rule wins.
fn extended_letter(p: &[Point]) -> InferenceResult<char> {
    let mut letter = None;

    if p[6].y > p[8].y && p[10].y > p[12].y && p[14].y > p[16].y && p[18].y > p[20].y {
        letter = Some('B');
    }
    if p[6].y > p[8].y && p[10].y < p[12].y && p[14].y < p[16].y && p[18].y < p[20].y {
        letter = Some('D');
    }
    if p[6].y < p[8].y && p[10].y > p[12].y && p[14].y > p[16].y && p[18].y > p[20].y {
        letter = Some('F');
    }
    if p[6].y < p[8].y && p[10].y < p[12].y && p[14].y < p[16].y && p[18].y > p[20].y {
        letter = Some('I');
    }
    if p[6].y > p[8].y && p[10].y > p[12].y && p[14].y > p[16].y && p[18].y < p[20].y {
        letter = Some('W');
    }
    if (p[6].y > p[8].y && p[10].y > p[12].y && p[14].y < p[16].y && p[18].y < p[20].y)
        && p[4].y < p[9].y
    {
        letter = Some('K');
    }
    if (d(p, 8, 12) - d(p, 6, 10)) < 8.0
        && (p[6].y > p[8].y && p[10].y > p[12].y && p[14].y < p[16].y && p[18].y < p[20].y)
    {
        letter = Some('U');
    }
    if (d(p, 8, 12) - d(p, 6, 10)) >= 8.0
        && (p[6].y > p[8].y && p[10].y > p[12].y && p[14].y < p[16].y && p[18].y < p[20].y)
        && p[4].y > p[9].y
    {
        letter = Some('V');
    }
    if p[8].x > p[12].x
        && (p[6].y > p[8].y && p[10].y > p[12].y && p[14].y < p[16].y && p[18].y < p[20].y)
    {
        letter = Some('R');
    }

    letter.ok_or(InferenceError::Unclassified { bucket: 1 })
}
