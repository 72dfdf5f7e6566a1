//! Key distribution planning
//!
//! Turns an inventory into an ordered list of external commands: one
//! `ssh-copy-id` per machine, plus a single `ssh-keygen` when the inventory
//! contains the local machine and its keypair does not exist yet. The keygen
//! step must run before any key is copied, so the plan is passed through
//! [`reorder_keygen_first`] before execution.
//!
//! Commands are structured argument vectors handed straight to the process
//! spawner; no shell is involved.

use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::inventory::{HostEntry, Inventory};

/// Key generation tool
pub const KEYGEN_PROGRAM: &str = "ssh-keygen";

/// Password-automation helper wrapping ssh-copy-id
pub const COPY_ID_PROGRAM: &str = "sshpass";

/// RSA key with empty passphrase, written to `id_rsa`, non-interactive
const KEYGEN_ARGS: [&str; 7] = ["-t", "rsa", "-N", "", "-f", "id_rsa", "-q"];

/// Placeholder shown wherever a password would appear in rendered output
const REDACTED: &str = "***";

/// One external process invocation
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// The process command for this invocation
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Copy of this invocation with any `sshpass -p` password masked
    ///
    /// Every human-facing rendering of an invocation must go through this;
    /// the raw form exists only to be spawned.
    pub fn redacted(&self) -> Invocation {
        let mut args = Vec::with_capacity(self.args.len());
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                args.push(REDACTED.to_string());
            } else {
                args.push(arg.clone());
            }
            mask_next = arg == "-p";
        }
        Invocation {
            program: self.program.clone(),
            args,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(' ') {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// One machine's slot in the plan: an optional keygen step plus the copy-id
/// step that pushes the public key to that machine
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommandPair {
    pub keygen: Option<Invocation>,
    pub copy_id: Invocation,
}

/// Conventional public-key path for a local user, as probed before
/// scheduling key generation
pub fn public_key_path(user: &str) -> PathBuf {
    Path::new("/home").join(user).join(".ssh").join("id_rsa.pub")
}

// Stat failures count as missing, so generation is scheduled rather than
// silently skipped.
fn public_key_exists(user: &str) -> bool {
    public_key_path(user).is_file()
}

/// The `-i` argument for ssh-copy-id
///
/// The invoking user's `~/.ssh/id_rsa.pub`, resolved here because no shell
/// is around to expand the tilde.
fn local_public_key_arg() -> String {
    match dirs::home_dir() {
        Some(home) => home.join(".ssh").join("id_rsa.pub").display().to_string(),
        None => "~/.ssh/id_rsa.pub".to_string(),
    }
}

fn keygen_invocation() -> Invocation {
    Invocation {
        program: KEYGEN_PROGRAM.to_string(),
        args: KEYGEN_ARGS.iter().map(|a| a.to_string()).collect(),
    }
}

fn copy_id_invocation(entry: &HostEntry, public_key: &str) -> Invocation {
    Invocation {
        program: COPY_ID_PROGRAM.to_string(),
        args: vec![
            "-p".to_string(),
            entry.pass.clone(),
            "ssh-copy-id".to_string(),
            "-i".to_string(),
            public_key.to_string(),
            entry.target(),
        ],
    }
}

/// Build the distribution plan for an inventory
///
/// Probes the real filesystem for existing public keys; see
/// [`build_plan_with`] for the injectable variant.
pub fn build_plan(inventory: &Inventory, local_ip: Option<Ipv4Addr>) -> Vec<CommandPair> {
    build_plan_with(inventory, local_ip, public_key_exists)
}

/// Build the distribution plan with a caller-supplied public-key probe
///
/// For each entry in inventory order: a keygen step is scheduled only when
/// the entry's host equals the local address and the probe reports no public
/// key for the entry's user. The finished plan has already been passed
/// through [`reorder_keygen_first`].
pub fn build_plan_with<F>(
    inventory: &Inventory,
    local_ip: Option<Ipv4Addr>,
    key_exists: F,
) -> Vec<CommandPair>
where
    F: Fn(&str) -> bool,
{
    let local = local_ip.map(|ip| ip.to_string());
    let public_key = local_public_key_arg();

    let mut plan = Vec::with_capacity(inventory.len());
    for entry in &inventory.machine {
        let is_local = local.as_deref() == Some(entry.host.as_str());
        let keygen = (is_local && !key_exists(&entry.user)).then(keygen_invocation);
        plan.push(CommandPair {
            keygen,
            copy_id: copy_id_invocation(entry, &public_key),
        });
    }

    tracing::debug!(
        "Planned {} copy-id steps, keygen {}",
        plan.len(),
        if plan.iter().any(|p| p.keygen.is_some()) {
            "required"
        } else {
            "not required"
        }
    );
    reorder_keygen_first(plan)
}

/// Move any keygen step to the front of the plan
///
/// For every position `k != 0` carrying a keygen step: the keygen moves to
/// position 0 and positions 0 and `k` exchange their copy-id payloads. Each
/// copy-id command keeps its original target, so the set of machines
/// receiving the key is unchanged; only the order shifts so that generation
/// happens before the first copy. A plan whose keygen is already at position
/// 0, or that has none, passes through untouched.
pub fn reorder_keygen_first(mut plan: Vec<CommandPair>) -> Vec<CommandPair> {
    for k in 1..plan.len() {
        if plan[k].keygen.is_some() {
            let keygen = plan[k].keygen.take();
            plan[0].keygen = keygen;
            let (head, tail) = plan.split_at_mut(k);
            std::mem::swap(&mut head[0].copy_id, &mut tail[0].copy_id);
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(host: &str, user: &str, pass: &str) -> HostEntry {
        HostEntry {
            host: host.to_string(),
            user: user.to_string(),
            pass: pass.to_string(),
        }
    }

    fn inventory(entries: Vec<HostEntry>) -> Inventory {
        Inventory { machine: entries }
    }

    /// Copy-id targets in plan order
    fn targets(plan: &[CommandPair]) -> Vec<&str> {
        plan.iter()
            .map(|p| p.copy_id.args.last().unwrap().as_str())
            .collect()
    }

    #[test]
    fn test_no_local_match_schedules_no_keygen() {
        let inv = inventory(vec![
            entry("10.0.0.5", "alice", "p1"),
            entry("10.0.0.9", "bob", "p2"),
        ]);
        let plan = build_plan_with(&inv, Some(Ipv4Addr::new(10, 0, 0, 77)), |_| false);

        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|p| p.keygen.is_none()));
        assert_eq!(targets(&plan), vec!["alice@10.0.0.5", "bob@10.0.0.9"]);
    }

    #[test]
    fn test_no_local_ip_schedules_no_keygen() {
        let inv = inventory(vec![entry("10.0.0.5", "alice", "p1")]);
        let plan = build_plan_with(&inv, None, |_| false);
        assert!(plan[0].keygen.is_none());
    }

    #[test]
    fn test_local_match_with_missing_key() {
        // The worked example: bob's machine is local and has no key yet.
        let inv = inventory(vec![
            entry("10.0.0.5", "alice", "p1"),
            entry("10.0.0.9", "bob", "p2"),
        ]);
        let plan = build_plan_with(&inv, Some(Ipv4Addr::new(10, 0, 0, 9)), |_| false);

        assert_eq!(plan.len(), 2);
        let keygen = plan[0].keygen.as_ref().unwrap();
        assert_eq!(keygen.program, KEYGEN_PROGRAM);
        assert_eq!(
            keygen.args,
            vec!["-t", "rsa", "-N", "", "-f", "id_rsa", "-q"]
        );
        assert!(plan[1].keygen.is_none());

        // Keygen fired first, but each copy-id kept its own target and
        // password.
        assert_eq!(targets(&plan), vec!["bob@10.0.0.9", "alice@10.0.0.5"]);
        assert_eq!(plan[0].copy_id.args[1], "p2");
        assert_eq!(plan[1].copy_id.args[1], "p1");
    }

    #[test]
    fn test_target_multiset_invariant_under_reorder() {
        let inv = inventory(vec![
            entry("10.0.0.5", "alice", "p1"),
            entry("10.0.0.7", "carol", "p3"),
            entry("10.0.0.9", "bob", "p2"),
        ]);
        let plan = build_plan_with(&inv, Some(Ipv4Addr::new(10, 0, 0, 9)), |_| false);

        let mut seen = targets(&plan);
        seen.sort_unstable();
        assert_eq!(
            seen,
            vec!["alice@10.0.0.5", "bob@10.0.0.9", "carol@10.0.0.7"]
        );
    }

    #[test]
    fn test_local_match_at_front_is_untouched() {
        let inv = inventory(vec![
            entry("10.0.0.9", "bob", "p2"),
            entry("10.0.0.5", "alice", "p1"),
        ]);
        let plan = build_plan_with(&inv, Some(Ipv4Addr::new(10, 0, 0, 9)), |_| false);

        assert!(plan[0].keygen.is_some());
        assert_eq!(targets(&plan), vec!["bob@10.0.0.9", "alice@10.0.0.5"]);
    }

    #[test]
    fn test_existing_key_suppresses_keygen() {
        let inv = inventory(vec![
            entry("10.0.0.5", "alice", "p1"),
            entry("10.0.0.9", "bob", "p2"),
        ]);
        let plan = build_plan_with(&inv, Some(Ipv4Addr::new(10, 0, 0, 9)), |_| true);

        assert!(plan.iter().all(|p| p.keygen.is_none()));
        // No reorder happened either.
        assert_eq!(targets(&plan), vec!["alice@10.0.0.5", "bob@10.0.0.9"]);
    }

    #[test]
    fn test_empty_inventory_empty_plan() {
        let plan = build_plan_with(&Inventory::default(), Some(Ipv4Addr::new(10, 0, 0, 9)), |_| {
            false
        });
        assert!(plan.is_empty());
    }

    #[test]
    fn test_reorder_without_keygen_is_identity() {
        let inv = inventory(vec![
            entry("10.0.0.5", "alice", "p1"),
            entry("10.0.0.9", "bob", "p2"),
        ]);
        let plan = build_plan_with(&inv, None, |_| false);
        let reordered = reorder_keygen_first(plan.clone());
        assert_eq!(plan, reordered);
    }

    #[test]
    fn test_probe_sees_entry_user() {
        let inv = inventory(vec![entry("10.0.0.9", "bob", "p2")]);
        let plan = build_plan_with(&inv, Some(Ipv4Addr::new(10, 0, 0, 9)), |user| {
            assert_eq!(user, "bob");
            true
        });
        assert!(plan[0].keygen.is_none());
    }

    #[test]
    fn test_public_key_path_convention() {
        assert_eq!(
            public_key_path("bob"),
            PathBuf::from("/home/bob/.ssh/id_rsa.pub")
        );
    }

    #[test]
    fn test_redaction_masks_only_the_password() {
        let inv = inventory(vec![entry("10.0.0.5", "alice", "s3cret")]);
        let plan = build_plan_with(&inv, None, |_| false);

        let shown = plan[0].copy_id.redacted().to_string();
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("-p ***"));
        assert!(shown.contains("ssh-copy-id"));
        assert!(shown.ends_with("alice@10.0.0.5"));

        // The raw invocation still carries the password for sshpass.
        assert_eq!(plan[0].copy_id.args[1], "s3cret");
    }

    #[test]
    fn test_keygen_display_quotes_empty_passphrase() {
        let shown = keygen_invocation().to_string();
        assert_eq!(shown, "ssh-keygen -t rsa -N '' -f id_rsa -q");
    }
}
