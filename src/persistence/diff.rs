//! Ordered insert/remove patches over element lists.
//!
//! A [`Diff`] describes how a source list turns into a target list.
//! Removal offsets index the *source* list, insertion offsets index the
//! *target* list, and the whole patch is applied as one edit: all removals
//! first (highest offset down), then all insertions (lowest offset up).

use thiserror::Error;

/// Reasons a diff cannot be built or applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("removal at offset {offset} is out of bounds for a list of length {len}")]
    RemovalOutOfBounds { offset: usize, len: usize },

    #[error("insertion at offset {offset} is out of bounds for a list of length {len}")]
    InsertionOutOfBounds { offset: usize, len: usize },

    #[error("element removed at offset {offset} does not match the list")]
    ElementMismatch { offset: usize },

    #[error("more than one {kind} at offset {offset}")]
    DuplicateOffset { kind: &'static str, offset: usize },

    #[error("move association at offset {offset} has no matching counterpart")]
    UnpairedMove { offset: usize },
}

/// A single edit inside a [`Diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<E> {
    /// Insert `element` so that it ends up at `offset` in the target list.
    Insert {
        offset: usize,
        element: E,
        /// Source offset of the paired removal when this insert is half of a move.
        moved_from: Option<usize>,
    },

    /// Remove `element`, found at `offset` in the source list.
    Remove {
        offset: usize,
        element: E,
        /// Target offset of the paired insertion when this removal is half of a move.
        moved_to: Option<usize>,
    },
}

impl<E> Change<E> {
    pub fn insert(offset: usize, element: E) -> Self {
        Change::Insert {
            offset,
            element,
            moved_from: None,
        }
    }

    pub fn remove(offset: usize, element: E) -> Self {
        Change::Remove {
            offset,
            element,
            moved_to: None,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Change::Insert { offset, .. } | Change::Remove { offset, .. } => *offset,
        }
    }

    pub fn element(&self) -> &E {
        match self {
            Change::Insert { element, .. } | Change::Remove { element, .. } => element,
        }
    }

    /// Offset of the other half of a move, if any.
    pub fn association(&self) -> Option<usize> {
        match self {
            Change::Insert { moved_from, .. } => *moved_from,
            Change::Remove { moved_to, .. } => *moved_to,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Change::Insert { .. })
    }

    fn set_association(&mut self, other: usize) {
        match self {
            Change::Insert { moved_from, .. } => *moved_from = Some(other),
            Change::Remove { moved_to, .. } => *moved_to = Some(other),
        }
    }
}

/// A validated, canonically ordered set of changes.
///
/// Removals are kept sorted by ascending source offset, insertions by
/// ascending target offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff<E> {
    removals: Vec<Change<E>>,
    insertions: Vec<Change<E>>,
}

impl<E> Default for Diff<E> {
    fn default() -> Self {
        Self {
            removals: Vec::new(),
            insertions: Vec::new(),
        }
    }
}

impl<E> Diff<E> {
    /// Build a diff from changes in any order.
    ///
    /// # Errors
    /// Fails on duplicate offsets within removals or within insertions, and
    /// on move associations that do not point at each other.
    pub fn new(changes: impl IntoIterator<Item = Change<E>>) -> Result<Self, DiffError> {
        let (mut insertions, mut removals): (Vec<_>, Vec<_>) =
            changes.into_iter().partition(Change::is_insert);
        insertions.sort_by_key(Change::offset);
        removals.sort_by_key(Change::offset);

        check_unique(&removals, "removal")?;
        check_unique(&insertions, "insertion")?;
        check_pairs(&insertions, &removals)?;
        check_pairs(&removals, &insertions)?;

        Ok(Self {
            removals,
            insertions,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.insertions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.removals.len() + self.insertions.len()
    }

    /// Removals, by ascending source offset.
    pub fn removals(&self) -> &[Change<E>] {
        &self.removals
    }

    /// Insertions, by ascending target offset.
    pub fn insertions(&self) -> &[Change<E>] {
        &self.insertions
    }

    /// All changes: removals first, then insertions.
    pub fn iter(&self) -> impl Iterator<Item = &Change<E>> {
        self.removals.iter().chain(self.insertions.iter())
    }

    pub fn into_changes(self) -> Vec<Change<E>> {
        let mut changes = self.removals;
        changes.extend(self.insertions);
        changes
    }
}

impl<E: Clone + PartialEq> Diff<E> {
    /// Apply the patch to `base`.
    ///
    /// Nothing is applied unless every change fits: a removal must name an
    /// offset inside `base` holding an equal element, and an insertion must
    /// land at or before the end of the list being built.
    ///
    /// The element check is stricter than offset validation alone: a diff
    /// whose offsets fit but whose removed element differs from the list is
    /// rejected with [`DiffError::ElementMismatch`] instead of removing
    /// whatever sits at that offset.
    pub fn apply(&self, base: &[E]) -> Result<Vec<E>, DiffError> {
        let mut result = base.to_vec();

        for change in self.removals.iter().rev() {
            let offset = change.offset();
            match result.get(offset) {
                None => {
                    return Err(DiffError::RemovalOutOfBounds {
                        offset,
                        len: base.len(),
                    })
                }
                Some(current) if current != change.element() => {
                    return Err(DiffError::ElementMismatch { offset });
                }
                Some(_) => {
                    result.remove(offset);
                }
            }
        }

        for change in &self.insertions {
            let offset = change.offset();
            if offset > result.len() {
                return Err(DiffError::InsertionOutOfBounds {
                    offset,
                    len: result.len(),
                });
            }
            result.insert(offset, change.element().clone());
        }

        Ok(result)
    }

    /// Inserted elements in ascending offset order, ignoring removals.
    pub fn inserted_elements(&self) -> Vec<E> {
        self.insertions.iter().map(|c| c.element().clone()).collect()
    }

    /// Compute a minimal insert/remove diff turning `old` into `new`.
    ///
    /// Trims the common prefix and suffix, then splits the rest with Myers'
    /// linear-space middle-snake search: `O((n + m) * d)` time and
    /// `O(n + m)` extra space, where `d` is the number of changes.
    pub fn between(old: &[E], new: &[E]) -> Self {
        let mut script = EditScript::default();
        script.diff(old, new, 0, 0);

        Self {
            removals: script
                .removed
                .into_iter()
                .map(|i| Change::remove(i, old[i].clone()))
                .collect(),
            insertions: script
                .inserted
                .into_iter()
                .map(|j| Change::insert(j, new[j].clone()))
                .collect(),
        }
    }

    /// Pair removals and insertions of equal elements as moves.
    ///
    /// Each removal is paired with the first still-unpaired insertion of an
    /// equal element. Application results are unchanged.
    pub fn inferring_moves(mut self) -> Self {
        for r in 0..self.removals.len() {
            if self.removals[r].association().is_some() {
                continue;
            }
            let partner = self.insertions.iter().position(|ins| {
                ins.association().is_none() && ins.element() == self.removals[r].element()
            });
            if let Some(k) = partner {
                let (from, to) = (self.removals[r].offset(), self.insertions[k].offset());
                self.removals[r].set_association(to);
                self.insertions[k].set_association(from);
            }
        }
        self
    }
}

fn check_unique<E>(sorted: &[Change<E>], kind: &'static str) -> Result<(), DiffError> {
    match sorted.windows(2).find(|w| w[0].offset() == w[1].offset()) {
        Some(w) => Err(DiffError::DuplicateOffset {
            kind,
            offset: w[0].offset(),
        }),
        None => Ok(()),
    }
}

/// Every association in `side` must point at a change in `other` that points back.
fn check_pairs<E>(side: &[Change<E>], other: &[Change<E>]) -> Result<(), DiffError> {
    for change in side {
        let Some(target) = change.association() else {
            continue;
        };
        let paired = other
            .binary_search_by_key(&target, Change::offset)
            .ok()
            .map(|idx| other[idx].association() == Some(change.offset()))
            .unwrap_or(false);
        if !paired {
            return Err(DiffError::UnpairedMove {
                offset: change.offset(),
            });
        }
    }
    Ok(())
}

/// Removed source indices and inserted target indices, each ascending.
#[derive(Default)]
struct EditScript {
    removed: Vec<usize>,
    inserted: Vec<usize>,
}

impl EditScript {
    fn diff<E: PartialEq>(&mut self, old: &[E], new: &[E], old_base: usize, new_base: usize) {
        let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
        let (old, new) = (&old[prefix..], &new[prefix..]);
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let (old, new) = (&old[..old.len() - suffix], &new[..new.len() - suffix]);
        let (old_base, new_base) = (old_base + prefix, new_base + prefix);

        let split = if old.is_empty() || new.is_empty() {
            None
        } else {
            middle_snake(old, new)
        };

        match split {
            Some((x, y)) => {
                self.diff(&old[..x], &new[..y], old_base, new_base);
                self.diff(&old[x..], &new[y..], old_base + x, new_base + y);
            }
            None => {
                self.removed.extend(old_base..old_base + old.len());
                self.inserted.extend(new_base..new_base + new.len());
            }
        }
    }
}

/// Point on an optimal edit path where the forward and reverse searches meet.
///
/// Expects non-empty lists whose first and last elements differ. `None`
/// means the lists have nothing in common worth keeping.
fn middle_snake<E: PartialEq>(old: &[E], new: &[E]) -> Option<(usize, usize)> {
    let (n, m) = (old.len() as isize, new.len() as isize);
    let max_d = (n + m + 1) / 2;
    let offset = max_d;
    let width = 2 * max_d + 2;
    let mut forward = vec![-1isize; width as usize];
    let mut reverse = vec![-1isize; width as usize];
    forward[(offset + 1) as usize] = 0;
    reverse[(offset + 1) as usize] = 0;

    let delta = n - m;
    // Odd delta: the forward search detects the overlap, otherwise the reverse one.
    let forward_detects = delta % 2 != 0;
    let (mut k1_start, mut k1_end, mut k2_start, mut k2_end) = (0, 0, 0, 0);

    for d in 0..max_d {
        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let i = (offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && forward[i - 1] < forward[i + 1]) {
                forward[i + 1]
            } else {
                forward[i - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 >= 0 && y1 >= 0 && x1 < n && y1 < m && old[x1 as usize] == new[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            forward[i] = x1;

            if x1 > n {
                k1_end += 2;
            } else if y1 > m {
                k1_start += 2;
            } else if forward_detects {
                let j = offset + delta - k1;
                if (0..width).contains(&j) && reverse[j as usize] != -1 {
                    let x2 = n - reverse[j as usize];
                    if x1 >= x2 {
                        return split_point(n, m, x1, y1);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let i = (offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && reverse[i - 1] < reverse[i + 1]) {
                reverse[i + 1]
            } else {
                reverse[i - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 >= 0
                && y2 >= 0
                && x2 < n
                && y2 < m
                && old[(n - x2 - 1) as usize] == new[(m - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            reverse[i] = x2;

            if x2 > n {
                k2_end += 2;
            } else if y2 > m {
                k2_start += 2;
            } else if !forward_detects {
                let j = offset + delta - k2;
                if (0..width).contains(&j) && forward[j as usize] != -1 {
                    let x1 = forward[j as usize];
                    let y1 = x1 - (j - offset);
                    if x1 >= n - x2 {
                        return split_point(n, m, x1, y1);
                    }
                }
            }
            k2 += 2;
        }
    }

    None
}

/// A split on a corner would not shrink the problem.
fn split_point(n: isize, m: isize, x: isize, y: isize) -> Option<(usize, usize)> {
    let inside = (0..=n).contains(&x) && (0..=m).contains(&y);
    let corner = (x == 0 && y == 0) || (x == n && y == m);
    (inside && !corner).then_some((x as usize, y as usize))
}
