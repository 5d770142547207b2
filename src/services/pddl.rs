//! PDDL problem files: reading initial relations, writing saved state.
//!
//! DESIGN
//! ======
//! Only the three predicates the annotator understands are read from an
//! `(:init ...)` section: `(on a b)`, `(in a b)` and `(closed a)`. Anything
//! else in the file (objects, goals, other predicates) is ignored. Output
//! mirrors the layout the downstream planner expects, with an empty goal
//! for the annotator to fill in by hand.

#[cfg(test)]
#[path = "pddl_test.rs"]
mod pddl_test;

use canvas::relations::{Closure, Placement, RelationSet};
use canvas::scene::SceneObject;

const DOMAIN: &str = "gripper-strips";

/// Parse the `on`/`in`/`closed` facts of the `(:init ...)` section.
///
/// Returns an empty set when the text has no init section.
#[must_use]
pub fn parse_init(text: &str) -> RelationSet {
    let mut relations = RelationSet::new();
    let stripped = strip_comments(text);
    let Some(body) = init_section(&stripped) else {
        return relations;
    };

    for fact in atoms(body) {
        let mut tokens = fact.split_whitespace();
        let Some(head) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();
        match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("on", [object, anchor]) => relations.on.push(Placement::new(*object, *anchor)),
            ("in", [object, anchor]) => relations.inside.push(Placement::new(*object, *anchor)),
            ("closed", [container]) => relations.closed.push(Closure::new(*container)),
            _ => {}
        }
    }
    relations
}

/// Render a problem file for `scene_id` listing every object and relation.
#[must_use]
pub fn render_problem(scene_id: &str, objects: &[SceneObject], relations: &RelationSet) -> String {
    let mut lines = vec![
        format!("(define (problem {scene_id}-goal)"),
        format!("  (:domain {DOMAIN})"),
        "  (:objects".to_owned(),
    ];
    lines.extend(objects.iter().map(|obj| format!("    {} - {}", obj.id, obj.category.as_str())));
    lines.push("  )".to_owned());
    lines.push("  (:init".to_owned());
    lines.extend(relations.on.iter().map(|p| format!("    (on {} {})", p.object, p.anchor)));
    lines.extend(relations.inside.iter().map(|p| format!("    (in {} {})", p.object, p.anchor)));
    lines.extend(relations.closed.iter().map(|c| format!("    (closed {})", c.container)));
    lines.push("  )".to_owned());
    lines.extend(
        ["  (:goal", "    (and", "      ;; Add goal conditions here", "    )", "  )", ")"].map(str::to_owned),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| line.split_once(';').map_or(line, |(code, _)| code))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The text between `(:init` and its matching close paren.
fn init_section(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find("(:init")? + "(:init".len();
    let mut depth = 1usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset]);
                }
            }
            _ => {}
        }
    }
    // Unterminated section: take the rest of the file.
    Some(&text[start..])
}

/// Innermost parenthesised groups, without their parens.
fn atoms(body: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut open: Option<usize> = None;
    for (i, ch) in body.char_indices() {
        match ch {
            '(' => open = Some(i + 1),
            ')' => {
                if let Some(start) = open.take() {
                    out.push(&body[start..i]);
                }
            }
            _ => {}
        }
    }
    out
}
