use std::collections::BTreeSet;

/// Conjunction of two `@requiresScopes` or `@policy` requirements.
///
/// Both sides are lists of alternatives, each alternative a group of scopes that must all be
/// granted. Requiring both `left` and `right` means satisfying one group of each: every pair of
/// groups is unioned. Groups that are strict supersets of another group are redundant and pruned.
/// Groups and their contents come out sorted. An empty side carries no requirement.
///
/// ```
/// use federation_composition::merge_scope_policies;
///
/// let merged = merge_scope_policies(&[vec!["read:users"]], &[vec!["admin"], vec!["read:all"]]);
/// assert_eq!(merged, vec![vec!["admin", "read:users"], vec!["read:all", "read:users"]]);
/// ```
pub fn merge_scope_policies<S: AsRef<str>>(left: &[Vec<S>], right: &[Vec<S>]) -> Vec<Vec<String>> {
    let left = normalize(left);
    let right = normalize(right);

    let mut candidates: Vec<BTreeSet<&str>> = match (left.is_empty(), right.is_empty()) {
        (true, _) => right,
        (_, true) => left,
        _ => left
            .iter()
            .flat_map(|left_group| {
                right
                    .iter()
                    .map(move |right_group| left_group.union(right_group).copied().collect())
            })
            .collect(),
    };

    // Smaller groups first, so that a group is always compared to its potential subsets.
    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let mut kept: Vec<BTreeSet<&str>> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if kept.iter().any(|group| group.is_subset(&candidate)) {
            continue;
        }
        kept.push(candidate);
    }

    let mut out: Vec<Vec<String>> = kept
        .into_iter()
        .map(|group| group.into_iter().map(str::to_owned).collect())
        .collect();

    out.sort();
    out
}

fn normalize<S: AsRef<str>>(groups: &[Vec<S>]) -> Vec<BTreeSet<&str>> {
    groups
        .iter()
        .map(|group| group.iter().map(AsRef::as_ref).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn groups(groups: &[&[&str]]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|group| group.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn pairwise_union() {
        let merged = merge_scope_policies(&groups(&[&["a", "b"]]), &groups(&[&["c"]]));
        assert_eq!(merged, groups(&[&["a", "b", "c"]]));
    }

    #[test]
    fn supersets_are_pruned() {
        let merged = merge_scope_policies(&groups(&[&["a"], &["b"]]), &groups(&[&["a"]]));
        assert_eq!(merged, groups(&[&["a"]]));
    }

    #[test]
    fn empty_side_is_no_requirement() {
        let merged = merge_scope_policies(&groups(&[]), &groups(&[&["y"], &["x"], &["x", "y"]]));
        assert_eq!(merged, groups(&[&["x"], &["y"]]));

        let merged = merge_scope_policies(&groups(&[&["b", "a"]]), &groups(&[]));
        assert_eq!(merged, groups(&[&["a", "b"]]));

        assert!(merge_scope_policies::<String>(&[], &[]).is_empty());
    }

    #[test]
    fn commutative_and_associative() {
        let a = groups(&[&["read"], &["admin", "write"]]);
        let b = groups(&[&["write"], &["audit"]]);
        let c = groups(&[&["admin"]]);

        assert_eq!(merge_scope_policies(&a, &b), merge_scope_policies(&b, &a));

        let left_first = merge_scope_policies(&merge_scope_policies(&a, &b), &c);
        let right_first = merge_scope_policies(&a, &merge_scope_policies(&b, &c));
        assert_eq!(left_first, right_first);
    }

    #[test]
    fn no_group_is_a_superset_of_another() {
        let merged = merge_scope_policies(
            &groups(&[&["a"], &["b", "c"], &["a", "d"]]),
            &groups(&[&["c"], &["a", "c"]]),
        );

        for (i, group) in merged.iter().enumerate() {
            for (j, other) in merged.iter().enumerate() {
                if i != j {
                    assert!(!other.iter().all(|item| group.contains(item)), "{other:?} is a subset of {group:?}");
                }
            }
        }

        assert_eq!(merged, groups(&[&["a", "c"], &["b", "c"]]));
    }
}
