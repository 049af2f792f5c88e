//! Primary-else-first selection among sibling contact entries.

/// The candidate picked from a list, and whether it was the primary one.
#[derive(Debug)]
pub struct Selection<'a, T> {
    pub item: &'a T,
    /// `true` only when the primary-flagged candidate was chosen
    pub primary: bool,
}

impl<T> Clone for Selection<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Selection<'_, T> {}

/// First primary-flagged candidate, else the first candidate.
pub fn select_primary<T>(candidates: &[T], is_primary: impl Fn(&T) -> bool) -> Option<Selection<'_, T>> {
    select_ranked(candidates, is_primary, |_| false)
}

/// First primary-flagged candidate, else the first preferred one, else the
/// first candidate. Ties always go to input order.
pub fn select_ranked<T>(
    candidates: &[T],
    is_primary: impl Fn(&T) -> bool,
    is_preferred: impl Fn(&T) -> bool,
) -> Option<Selection<'_, T>> {
    if let Some(item) = candidates.iter().find(|c| is_primary(c)) {
        return Some(Selection { item, primary: true });
    }

    candidates
        .iter()
        .find(|c| is_preferred(c))
        .or_else(|| candidates.first())
        .map(|item| Selection { item, primary: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Entry {
        id: u8,
        primary: bool,
        mobile: bool,
    }

    fn entry(id: u8, primary: bool, mobile: bool) -> Entry {
        Entry { id, primary, mobile }
    }

    #[test]
    fn test_primary_wins_regardless_of_position() {
        let entries = [entry(1, false, false), entry(2, true, false), entry(3, true, false)];
        let picked = select_primary(&entries, |e| e.primary).unwrap();
        assert_eq!(picked.item.id, 2);
        assert!(picked.primary);
    }

    #[test]
    fn test_first_when_no_primary() {
        let entries = [entry(1, false, false), entry(2, false, false)];
        let picked = select_primary(&entries, |e| e.primary).unwrap();
        assert_eq!(picked.item.id, 1);
        assert!(!picked.primary);
    }

    #[test]
    fn test_empty_yields_none() {
        let entries: [Entry; 0] = [];
        assert!(select_primary(&entries, |e| e.primary).is_none());
    }

    #[test]
    fn test_ranked_prefers_before_falling_back() {
        let entries = [entry(1, false, false), entry(2, false, true), entry(3, false, true)];
        let picked = select_ranked(&entries, |e| e.primary, |e| e.mobile).unwrap();
        assert_eq!(picked.item.id, 2);
        assert!(!picked.primary);

        let entries = [entry(1, false, true), entry(2, true, false)];
        let picked = select_ranked(&entries, |e| e.primary, |e| e.mobile).unwrap();
        assert_eq!(picked.item.id, 2);
        assert!(picked.primary);

        let entries = [entry(1, false, false), entry(2, false, false)];
        let picked = select_ranked(&entries, |e| e.primary, |e| e.mobile).unwrap();
        assert_eq!(picked.item.id, 1);
    }
}
