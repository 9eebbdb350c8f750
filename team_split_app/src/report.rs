use itertools::Itertools;

use team_split_engine::Team;

/// Renders teams as numbered plain text, one block per group:
///
/// ```text
/// Group 1
/// 1. Alice
/// 2. Bob
///
/// Group 2
/// 1. Carol
/// ```
pub fn groups_to_plain_text(groups: &[Team]) -> String {
    groups
        .iter()
        .enumerate()
        .map(|(index, members)| {
            let lines = members
                .iter()
                .enumerate()
                .map(|(member_index, member)| format!("{}. {}", member_index + 1, member));
            std::iter::once(format!("Group {}", index + 1))
                .chain(lines)
                .join("\n")
        })
        .join("\n\n")
}
