use crate::types::GitHubRepo;

/// Largest `h` such that at least `h` of the counts are each `>= h`.
///
/// Sorts a copy, so the caller's ordering is left alone.
pub fn compute_h_index(counts: &[u32]) -> usize {
    let mut sorted = counts.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut h = 0;
    while h < sorted.len() && sorted[h] as usize > h {
        h += 1;
    }

    h
}

/// Sum of stars across all repositories
pub fn total_stars(repositories: &[GitHubRepo]) -> u64 {
    repositories
        .iter()
        .map(|repo| u64::from(repo.stargazers_count))
        .sum()
}

/// h-index over the star counts of the given repositories
pub fn repositories_h_index(repositories: &[GitHubRepo]) -> usize {
    let counts: Vec<u32> = repositories.iter().map(|repo| repo.stargazers_count).collect();
    compute_h_index(&counts)
}
