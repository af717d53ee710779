//! Bash rendering
//!
//! Turns a [`Plan`] into a self-contained bash script. Rendering is
//! deterministic: the same plan always yields the same bytes. Values that
//! must differ per run (unique organization names) are computed by the
//! script itself.

use crate::command::{Command, Fragment, Word, shell_quote};
use crate::guard::{Existence, Lookup, normalize_label};
use crate::step::{
    Action, FailureKind, ForEach, GuardedCreate, OnFailure, Phase, Plan, PlanKind, Step,
};
use crate::verify::{Condition, VerificationLoop};
use tracing::debug;

/// Shell helpers shared by every generated script
///
/// Listing rows start with the resource id; the label is whatever follows.
/// Keys arrive already normalized by [`normalize_label`] and are passed to
/// awk through the environment so backslashes stay literal. awk runs in the
/// C locale: matching is byte-wise and only ASCII letters fold case.
pub const PRELUDE: &str = r#"# Succeeds when a row of the listing on stdin has a label containing $1
listing_has_label() {
  LABEL_KEY="$1" LC_ALL=C awk 'BEGIN { missing = 1 } { $1 = ""; if (index(tolower($0), ENVIRON["LABEL_KEY"]) > 0) missing = 0 } END { exit missing }'
}

# Succeeds when the listing in $1 contains every following label
has_all_labels() {
  local listing="$1"
  shift
  local key
  for key in "$@"; do
    printf '%s\n' "$listing" | listing_has_label "$key" || return 1
  done
}

# Number of non-empty rows on stdin
count_rows() {
  awk 'NF { n++ } END { print n + 0 }'
}

# Prints present, absent or unknown for label $1 in the listing printed by the remaining arguments
check_existence() {
  local key="$1"
  shift
  local listing
  if ! listing=$("$@" 2>/dev/null); then
    echo unknown
    return 0
  fi
  if printf '%s\n' "$listing" | listing_has_label "$key"; then
    echo present
  else
    echo absent
  fi
}

# Prints the id of the first row whose label contains $1, or nothing
resolve_id() {
  local key="$1"
  shift
  local listing
  listing=$("$@" 2>/dev/null) || return 0
  printf '%s\n' "$listing" | LABEL_KEY="$key" LC_ALL=C awk '{ id = $1; $1 = ""; if (!found && index(tolower($0), ENVIRON["LABEL_KEY"]) > 0) { print id; found = 1 } }'
}

# First column of every non-empty row printed by the arguments
list_ids() {
  "$@" 2>/dev/null | awk 'NF { print $1 }'
}"#;

/// Rendering options that do not affect the plan itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Topology document name shown in the banner
    pub source: Option<String>,
}

fn title(kind: PlanKind) -> &'static str {
    match kind {
        PlanKind::Setup => "Demo ecosystem setup",
        PlanKind::Cleanup => "Demo ecosystem cleanup",
    }
}

/// Render a plan as a bash script
pub fn render_script(plan: &Plan, options: &ScriptOptions) -> String {
    let mut writer = ScriptWriter::new(&plan.cli);
    writer.header(plan, options);
    for (index, phase) in plan.phases.iter().enumerate() {
        writer.phase(index + 1, phase);
    }
    writer.blank();
    writer.echo("");
    writer.echo(&format!("✓ {} complete", title(plan.kind)));

    debug!(
        kind = %plan.kind,
        bytes = writer.out.len(),
        "Script rendered"
    );
    writer.out
}

fn dependency_missing(lookup: &Lookup) -> String {
    FailureKind::DependencyMissing.message(&format!("{} {}", lookup.kind, lookup.label))
}

struct ScriptWriter<'a> {
    cli: &'a str,
    out: String,
    indent: usize,
}

impl<'a> ScriptWriter<'a> {
    fn new(cli: &'a str) -> Self {
        Self {
            cli,
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn echo(&mut self, message: &str) {
        self.line(&format!("echo {}", shell_quote(message)));
    }

    fn echo_word(&mut self, word: &Word) {
        self.line(&format!("echo {}", word.render()));
    }

    fn nested(&mut self, body: impl FnOnce(&mut Self)) {
        self.indent += 1;
        body(self);
        self.indent -= 1;
    }

    fn command(&self, command: &Command) -> String {
        command.render(self.cli)
    }

    fn header(&mut self, plan: &Plan, options: &ScriptOptions) {
        self.line("#!/usr/bin/env bash");
        self.line(&format!("# {}", title(plan.kind)));
        self.line(&format!("# Profile: {} (CLI: {})", plan.profile, plan.cli));
        if let Some(source) = &options.source {
            self.line(&format!("# Generated from {} by demoflow", source));
        } else {
            self.line("# Generated by demoflow");
        }
        self.blank();
        self.line("set -eo pipefail");
        self.blank();
        for line in PRELUDE.lines() {
            self.line(line);
        }
        self.blank();
        self.echo(&format!("{} ({} profile)", title(plan.kind), plan.profile));
    }

    fn phase(&mut self, number: usize, phase: &Phase) {
        self.blank();
        self.line("# ------------------------------------------------------------");
        self.line(&format!("# Phase {}: {}", number, phase.title));
        self.line("# ------------------------------------------------------------");
        if !phase.is_notes_only() {
            self.echo("");
            self.echo(&format!("==> {}", phase.title));
        }
        for step in &phase.steps {
            self.step(step);
        }
    }

    fn step(&mut self, step: &Step) {
        if !step.description.is_empty() {
            self.echo(&step.description);
        }

        match &step.action {
            Action::Note { lines } => {
                for line in lines {
                    self.line(&format!("# {}", line));
                }
            }
            Action::Run { command } => {
                let message = format!("{} failed", command.verb());
                let command = self.command(command);
                self.guarded_line(&command, step.on_failure, &message);
            }
            Action::Create(create) => self.create(step, create),
            Action::Resolve { lookup, then } => self.resolve(lookup, then),
            Action::ForEach(each) => self.for_each(each),
            Action::Verify(verify) => self.verify(verify),
            Action::MakeDirectory { path } => {
                let path = path.to_string_lossy();
                let command = format!("mkdir -p {}", shell_quote(&path));
                let message = format!("Could not create directory {}", path);
                self.guarded_line(&command, step.on_failure, &message);
            }
        }
    }

    /// Report a failure according to `policy`
    fn fail(&mut self, policy: OnFailure, message: &str) {
        match policy {
            OnFailure::Abort => {
                self.echo(&format!("❌ {} - stopping", message));
                self.line("exit 1");
            }
            OnFailure::WarnAndContinue => {
                self.echo(&format!("  ⚠ {} - continuing", message));
            }
        }
    }

    fn guarded_line(&mut self, command: &str, policy: OnFailure, message: &str) {
        match policy {
            OnFailure::Abort => {
                self.line(&format!("if ! {}; then", command));
                self.nested(|w| w.fail(policy, message));
                self.line("fi");
            }
            OnFailure::WarnAndContinue => {
                self.line(&format!(
                    "{} || echo {}",
                    command,
                    shell_quote(&format!("  ⚠ {} - continuing", message))
                ));
            }
        }
    }

    fn create(&mut self, step: &Step, create: &GuardedCreate) {
        let guard = &create.guard;
        let subject = format!("{} {}", guard.kind, guard.key);
        let listing = self.command(&guard.listing());

        self.line(&format!(
            "existence=$(check_existence {} {})",
            shell_quote(&guard.normalized_key()),
            listing
        ));
        self.line("if [ \"$existence\" = present ]; then");
        self.nested(|w| w.echo(&format!("  ✓ {} already exists - skipping", subject)));
        self.line("else");
        self.nested(|w| {
            w.line("if [ \"$existence\" = unknown ]; then");
            w.nested(|w| {
                w.echo(&format!(
                    "  ⚠ {} - attempting to create {} anyway",
                    FailureKind::QueryFailed.message(guard.kind.plural()),
                    subject
                ))
            });
            w.line("fi");

            if let Some(lookup) = &create.requires {
                w.lookup_or_stop(lookup);
            }
            if let Some(binding) = &create.binding {
                w.line(&format!("{}={}", binding.var, binding.value.render()));
            }

            let command = w.command(&create.command);
            w.line(&format!("if {}; then", command));
            w.nested(|w| {
                match &create.binding {
                    Some(binding) => w.echo_word(&Word::concat(vec![
                        Fragment::Text(format!("  ✓ Created {} as ", subject)),
                        Fragment::Var(binding.var.clone()),
                    ])),
                    None => w.echo(&format!("  ✓ Created {}", subject)),
                }
                for note in &create.followups {
                    w.line(&format!("# Note: {}", note));
                    w.echo(&format!("  Note: {}", note));
                }
                if let Some(secs) = create.pause_after_secs {
                    w.line(&format!("sleep {}  # rate limiting", secs));
                }
            });
            w.line("else");
            w.nested(|w| w.create_failed(step, &subject));
            w.line("fi");
        });
        self.line("fi");
    }

    fn create_failed(&mut self, step: &Step, subject: &str) {
        let message = FailureKind::CreationFailed.message(subject);
        let absent = step.effective_policy(Existence::Absent);
        let unknown = step.effective_policy(Existence::Unknown);
        if absent == unknown {
            self.fail(absent, &message);
            return;
        }
        self.line("if [ \"$existence\" = unknown ]; then");
        self.nested(|w| w.fail(unknown, &message));
        self.line("else");
        self.nested(|w| w.fail(absent, &message));
        self.line("fi");
    }

    fn resolve_line(&mut self, lookup: &Lookup) {
        let listing = self.command(&lookup.listing());
        self.line(&format!(
            "{}=$(resolve_id {} {})",
            lookup.var,
            shell_quote(&normalize_label(&lookup.label)),
            listing
        ));
    }

    /// Resolve a required dependency, stopping the script when it is missing
    fn lookup_or_stop(&mut self, lookup: &Lookup) {
        let message = dependency_missing(lookup);
        self.resolve_line(lookup);
        self.line(&format!("if [ -z \"${}\" ]; then", lookup.var));
        self.nested(|w| {
            if lookup.required {
                w.fail(OnFailure::Abort, &message);
            } else {
                w.echo(&format!("  ⚠ {} - skipping", message));
            }
        });
        self.line("fi");
    }

    fn resolve(&mut self, lookup: &Lookup, then: &[Step]) {
        if lookup.required {
            self.lookup_or_stop(lookup);
            for step in then {
                self.step(step);
            }
            return;
        }

        let message = dependency_missing(lookup);
        self.resolve_line(lookup);
        self.line(&format!("if [ -z \"${}\" ]; then", lookup.var));
        self.nested(|w| w.echo(&format!("  ⚠ {} - skipping", message)));
        self.line("else");
        self.nested(|w| {
            for step in then {
                w.step(step);
            }
        });
        self.line("fi");
    }

    fn for_each(&mut self, each: &ForEach) {
        let ids = format!("{}s", each.var);
        let listing = self.command(&each.listing);
        let query_failed = FailureKind::QueryFailed.message(each.listing.verb());

        self.line(&format!("if {}=$(list_ids {}); then", ids, listing));
        self.nested(|w| {
            w.line(&format!("for {} in ${}; do", each.var, ids));
            w.nested(|w| {
                if !each.exclude.is_empty() {
                    let tests: Vec<String> = each
                        .exclude
                        .iter()
                        .map(|id| format!("[ \"${}\" = {} ]", each.var, shell_quote(id)))
                        .collect();
                    w.line(&format!("if {}; then", tests.join(" || ")));
                    w.nested(|w| {
                        w.echo_word(&Word::concat(vec![
                            Fragment::Text("  Skipping protected id ".to_string()),
                            Fragment::Var(each.var.clone()),
                        ]));
                        w.line("continue");
                    });
                    w.line("fi");
                }
                w.echo_word(&Word::concat(vec![
                    Fragment::Text(format!("  {}: ", each.item_label)),
                    Fragment::Var(each.var.clone()),
                ]));
                for step in &each.body {
                    w.step(step);
                }
            });
            w.line("done");
        });
        self.line("else");
        self.nested(|w| w.echo(&format!("  ⚠ {} - skipping", query_failed)));
        self.line("fi");
    }

    fn verify(&mut self, verify: &VerificationLoop) {
        let listing = self.command(&verify.condition.listing());
        let attempts = verify.attempts;
        let (check, done, subject) = match &verify.condition {
            Condition::LabelsListed { kind, labels } => {
                let keys: Vec<String> = labels
                    .iter()
                    .map(|label| shell_quote(&normalize_label(label)))
                    .collect();
                (
                    format!("has_all_labels \"$listing\" {}", keys.join(" ")),
                    format!("  ✓ All {} are listed", kind.plural()),
                    format!("Declared {}", kind.plural()),
                )
            }
            Condition::Drained { kind } => (
                "[ \"$(printf '%s\\n' \"$listing\" | count_rows)\" -eq 0 ]".to_string(),
                format!("  ✓ No {} left", kind.plural()),
                format!("Deletion of {}", kind.plural()),
            ),
        };

        self.line(&format!(
            "# {} attempts, up to {}s of waiting",
            attempts,
            verify.max_wait_secs()
        ));
        self.line("verified=false");
        self.line(&format!("for attempt in $(seq 1 {}); do", attempts));
        self.nested(|w| {
            w.line(&format!("if listing=$({} 2>/dev/null); then", listing));
            w.nested(|w| {
                w.line(&format!("if {}; then", check));
                w.nested(|w| {
                    w.line("verified=true");
                    w.line("break");
                });
                w.line("fi");
            });
            w.line("fi");
            w.line(&format!("if [ \"$attempt\" -lt {} ]; then", attempts));
            w.nested(|w| {
                w.echo_word(&Word::concat(vec![
                    Fragment::Text(format!("  Waiting {}s (attempt ", verify.delay_secs)),
                    Fragment::Var("attempt".to_string()),
                    Fragment::Text(format!("/{})", attempts)),
                ]));
                w.line(&format!("sleep {}", verify.delay_secs));
            });
            w.line("fi");
        });
        self.line("done");
        self.line("if [ \"$verified\" = true ]; then");
        self.nested(|w| w.echo(&done));
        self.line("else");
        self.nested(|w| {
            w.echo(&format!(
                "  ⚠ {} after {} attempts - continuing",
                FailureKind::VerificationTimeout.message(&subject),
                attempts
            ))
        });
        self.line("fi");
    }
}
