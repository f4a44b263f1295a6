//! Search — Knuth-Morris-Pratt over raw bytes, in both directions.
//!
//! Four entry points share one matcher:
//!
//! | Function                 | Direction | Comparison                        |
//! |--------------------------|-----------|-----------------------------------|
//! | [`find_forward`]         | forward   | `a == b`                          |
//! | [`find_backward`]        | backward  | `a == b`                          |
//! | [`find_forward_masked`]  | forward   | `a & mask == b & mask`            |
//! | [`find_backward_masked`] | backward  | `a & mask == b & mask`            |
//!
//! All four return the offset of the match's lowest address within the
//! haystack. Forward finds the leftmost match, backward the rightmost. An
//! empty needle, an empty haystack, or a needle longer than the haystack is
//! simply "not found".
//!
//! # The fallback table
//!
//! Before scanning, the needle is correlated with itself: for every shift
//! `d`, we count how many leading needle positions agree with the positions
//! `d` further along, and record that count at the index where agreement
//! stops. On a mismatch after `i` matched bytes the table says how far the
//! window can slide and how many bytes are already known to match. For
//! exact and uniformly masked patterns, confirmed haystack bytes are never
//! compared twice.
//!
//! Backward search runs the same matcher on mirrored indices
//! (`len - 1 - i`) for both haystack and needle.
//!
//! # Masks
//!
//! With a mask, each needle position is a predicate on haystack bytes
//! rather than a single value. Two positions can be the *same* predicate
//! (equal masks, equal masked bytes), *disjoint* ones (no byte satisfies
//! both), or merely *overlapping* ones. Same and disjoint pairs behave
//! exactly like equal and unequal bytes in the exact matcher. An overlapping
//! pair means a shifted window might still match, so it adds a conservative
//! fallback that rechecks from the last confirmed byte. Mixed masks can
//! therefore compare a haystack byte more than once and lose the linear
//! bound. Patterns with a uniform mask never produce overlapping pairs and
//! stay linear.

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Offset of the first occurrence of `needle` in `haystack`.
#[must_use]
pub fn find_forward(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    find(haystack, needle, None, SearchDirection::Forward)
}

/// Offset of the last occurrence of `needle` in `haystack`.
#[must_use]
pub fn find_backward(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    find(haystack, needle, None, SearchDirection::Backward)
}

/// Offset of the first `o` where every `haystack[o + i] & mask[i]` equals
/// `needle[i] & mask[i]`. A mask of a different length never matches.
#[must_use]
pub fn find_forward_masked(haystack: &[u8], needle: &[u8], mask: &[u8]) -> Option<usize> {
    if mask.len() != needle.len() {
        return None;
    }
    find(haystack, needle, Some(mask), SearchDirection::Forward)
}

/// Like [`find_forward_masked`], but the last such `o`.
#[must_use]
pub fn find_backward_masked(haystack: &[u8], needle: &[u8], mask: &[u8]) -> Option<usize> {
    if mask.len() != needle.len() {
        return None;
    }
    find(haystack, needle, Some(mask), SearchDirection::Backward)
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// A byte sequence read in search order.
#[derive(Clone, Copy)]
struct Oriented<'a> {
    bytes: &'a [u8],
    direction: SearchDirection,
}

impl Oriented<'_> {
    #[inline]
    fn at(self, i: usize) -> u8 {
        match self.direction {
            SearchDirection::Forward => self.bytes[i],
            SearchDirection::Backward => self.bytes[self.bytes.len() - 1 - i],
        }
    }
}

/// How two needle positions relate as predicates on a haystack byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Relation {
    Same,
    Disjoint,
    Overlap,
}

/// Compare two `(byte, mask)` needle positions.
const fn relate((a, ma): (u8, u8), (b, mb): (u8, u8)) -> Relation {
    if ma == mb && a & ma == b & mb {
        Relation::Same
    } else if (a ^ b) & ma & mb != 0 {
        Relation::Disjoint
    } else {
        Relation::Overlap
    }
}

/// Where to resume after a mismatch: slide the window by `shift` and treat
/// the first `keep` needle bytes as already matched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Fallback {
    shift: usize,
    keep: usize,
}

/// Build the fallback table for a needle of length `n`. `relation(a, b)`
/// compares needle positions `a` and `b` in search order.
///
/// Entry `j` is consulted after matching `j` bytes and missing the next
/// one. `None` means no shift up to `j` can match: skip past the miss.
fn fallback_table(
    n: usize,
    relation: impl Fn(usize, usize) -> Relation,
) -> Vec<Option<Fallback>> {
    // Longest self-overlap that stops exactly at each index.
    let mut overlap: Vec<Option<usize>> = vec![None; n + 1];
    // Smallest shift whose overlap stopped on an overlapping pair before
    // each index; it stays possible for every later mismatch.
    let mut pending: Vec<Option<Fallback>> = vec![None; n + 1];

    for d in 1..n {
        let mut i = 0;
        let mut stop = Relation::Same;
        while i < n - d {
            stop = relation(i, d + i);
            if stop != Relation::Same {
                break;
            }
            i += 1;
        }
        overlap[d + i] = overlap[d + i].max(Some(i));

        if stop == Relation::Overlap {
            for slot in pending.iter_mut().take(n).skip(d + i + 1) {
                if slot.is_none() {
                    *slot = Some(Fallback { shift: d, keep: i });
                }
            }
        }
    }

    overlap
        .iter()
        .zip(pending)
        .enumerate()
        .map(|(j, (&keep, loose))| {
            let exact = keep.map(|keep| Fallback {
                shift: j - keep,
                keep,
            });
            match (exact, loose) {
                (Some(a), Some(b)) => Some(if b.shift < a.shift { b } else { a }),
                (a, b) => a.or(b),
            }
        })
        .collect()
}

/// The shared matcher. `mask` is `None` for exact comparison.
fn find(
    haystack: &[u8],
    needle: &[u8],
    mask: Option<&[u8]>,
    direction: SearchDirection,
) -> Option<usize> {
    let (h, n) = (haystack.len(), needle.len());
    if h == 0 || n == 0 || n > h {
        return None;
    }

    let hay = Oriented {
        bytes: haystack,
        direction,
    };
    let pat = Oriented {
        bytes: needle,
        direction,
    };
    let mask = mask.map(|bytes| Oriented { bytes, direction });
    let mask_at = |i: usize| mask.map_or(0xFF, |m| m.at(i));

    let table = fallback_table(n, |a, b| {
        relate((pat.at(a), mask_at(a)), (pat.at(b), mask_at(b)))
    });

    let (mut m, mut i) = (0, 0);
    while m + i < h {
        let bits = mask_at(i);
        if hay.at(m + i) & bits == pat.at(i) & bits {
            i += 1;
            if i == n {
                return Some(match direction {
                    SearchDirection::Forward => m,
                    SearchDirection::Backward => h - m - n,
                });
            }
            continue;
        }

        match table[i] {
            None => {
                m += i + 1;
                i = 0;
            }
            Some(Fallback { shift, keep }) => {
                m += shift;
                i = keep;
            }
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
