//! Character-level corruption
//!
//! Typo simulation inside a single surface: dropped, doubled and transposed
//! characters, and letters replaced by a neighboring key on a QWERTY keyboard.

use rand::Rng;
use rand::seq::SliceRandom;

use super::config::NoiseConfig;
use super::fires;

const QWERTY_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Keys around `key` on a QWERTY layout, in the case of `key`.
///
/// Candidates come from the key's row and the rows directly above and below,
/// at the same column and the columns on each side. Row stagger is ignored.
/// Keys outside the three letter rows have no neighbors.
pub fn qwerty_neighbors(key: char) -> Vec<char> {
    let upper = key.is_uppercase();
    let lower = if upper {
        key.to_lowercase().next().unwrap_or(key)
    } else {
        key
    };

    let rows: Vec<Vec<char>> = QWERTY_ROWS.iter().map(|row| row.chars().collect()).collect();
    let Some((row_index, column)) = rows
        .iter()
        .enumerate()
        .find_map(|(i, row)| row.iter().position(|&c| c == lower).map(|col| (i, col)))
    else {
        return Vec::new();
    };

    let first = row_index.saturating_sub(1);
    let last = (row_index + 1).min(rows.len() - 1);

    let mut neighbors = Vec::new();
    for row in &rows[first..=last] {
        for offset in [-1isize, 0, 1] {
            let Some(col) = column.checked_add_signed(offset) else {
                continue;
            };
            if let Some(&c) = row.get(col) {
                if c != lower {
                    neighbors.push(c);
                }
            }
        }
    }

    if upper {
        neighbors
            .into_iter()
            .flat_map(|c| c.to_uppercase())
            .collect()
    } else {
        neighbors
    }
}

/// Scan `surface` and apply at most one character rule per position, in
/// priority order: drop, duplicate, swap with the next character, QWERTY
/// substitution.
pub fn apply_character_noise<R: Rng + ?Sized>(
    surface: &str,
    config: &NoiseConfig,
    rng: &mut R,
) -> String {
    let chars: Vec<char> = surface.chars().collect();
    let mut noisy = String::with_capacity(surface.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if fires(rng, config.drop_char_prob) {
            // dropped
        } else if fires(rng, config.duplicate_char_prob) {
            noisy.push(c);
            noisy.push(c);
        } else if i + 1 < chars.len() && fires(rng, config.swap_char_prob) {
            noisy.push(chars[i + 1]);
            noisy.push(c);
            i += 1;
        } else if fires(rng, config.substitute_char_prob) && c.is_alphabetic() {
            let neighbors = qwerty_neighbors(c);
            noisy.push(*neighbors.choose(rng).unwrap_or(&c));
        } else {
            noisy.push(c);
        }
        i += 1;
    }
    noisy
}
