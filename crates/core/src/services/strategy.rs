//! Escalation target selection strategies.
//!
//! Selection is a pure function over the candidate pool and its current
//! load, so every strategy is unit-testable without a database. The
//! escalation service builds the pool and hands over an RNG.

use rand::Rng;
use resolveit_common::{AppError, AppResult};
use resolveit_db::entities::user::Role;

/// Markers that identify a senior admin by name or email.
const SENIORITY_MARKERS: [&str; 3] = ["senior", "head", "manager"];

/// How the auto-escalation sweep picks its target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EscalationStrategy {
    /// Always the first admin.
    FirstAdmin,
    /// Rotate through admins by total escalation count.
    RoundRobin,
    /// The admin with the fewest active escalations.
    LeastLoaded,
    /// A random admin.
    Random,
    /// An admin whose name or email suggests seniority, else the first.
    SeniorAdmin,
    /// Prefer superadmins (least loaded), fall back to admins.
    #[default]
    SuperAdminOnly,
}

impl EscalationStrategy {
    /// Parse a strategy name from configuration. Case-insensitive.
    pub fn parse(name: &str) -> AppResult<Self> {
        match name.trim().to_uppercase().as_str() {
            "FIRST_ADMIN" => Ok(Self::FirstAdmin),
            "ROUND_ROBIN" => Ok(Self::RoundRobin),
            "LEAST_LOADED" => Ok(Self::LeastLoaded),
            "RANDOM" => Ok(Self::Random),
            "SENIOR_ADMIN" => Ok(Self::SeniorAdmin),
            "SUPERADMIN_ONLY" => Ok(Self::SuperAdminOnly),
            other => Err(AppError::Config(format!(
                "Unknown escalation strategy: {other}"
            ))),
        }
    }
}

/// One potential escalation target.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// User ID.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role (admin or superadmin).
    pub role: Role,
    /// Number of active escalations currently targeting this user.
    pub active_load: u64,
}

/// Pick an escalation target from the candidate pool.
///
/// `total_escalations` feeds the round-robin rotation. Fails when the pool
/// is empty.
pub fn select_target<'a, R: Rng>(
    strategy: EscalationStrategy,
    candidates: &'a [Candidate],
    total_escalations: u64,
    rng: &mut R,
) -> AppResult<&'a Candidate> {
    if candidates.is_empty() {
        return Err(AppError::Internal(
            "No admin users available for escalation".to_string(),
        ));
    }

    // General strategies work over admins; the pool degrades gracefully to
    // whatever is available when no plain admin exists.
    let admins: Vec<&Candidate> = {
        let only_admins: Vec<&Candidate> =
            candidates.iter().filter(|c| c.role == Role::Admin).collect();
        if only_admins.is_empty() {
            candidates.iter().collect()
        } else {
            only_admins
        }
    };

    let chosen = match strategy {
        EscalationStrategy::FirstAdmin => admins[0],
        EscalationStrategy::RoundRobin => {
            admins[usize::try_from(total_escalations).unwrap_or(usize::MAX) % admins.len()]
        }
        EscalationStrategy::LeastLoaded => least_loaded(&admins),
        EscalationStrategy::Random => admins[rng.gen_range(0..admins.len())],
        EscalationStrategy::SeniorAdmin => admins
            .iter()
            .find(|c| {
                let name = c.name.to_lowercase();
                let email = c.email.to_lowercase();
                SENIORITY_MARKERS
                    .iter()
                    .any(|m| name.contains(m) || email.contains(m))
            })
            .copied()
            .unwrap_or(admins[0]),
        EscalationStrategy::SuperAdminOnly => {
            let supers: Vec<&Candidate> = candidates
                .iter()
                .filter(|c| c.role == Role::SuperAdmin)
                .collect();
            if supers.is_empty() {
                admins[0]
            } else {
                least_loaded(&supers)
            }
        }
    };

    Ok(chosen)
}

fn least_loaded<'a>(pool: &[&'a Candidate]) -> &'a Candidate {
    pool.iter()
        .copied()
        .min_by_key(|c| c.active_load)
        .unwrap_or(pool[0])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn admin(id: &str, name: &str, load: u64) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{id}@example.com"),
            role: Role::Admin,
            active_load: load,
        }
    }

    fn superadmin(id: &str, load: u64) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: "Root".to_string(),
            email: format!("{id}@example.com"),
            role: Role::SuperAdmin,
            active_load: load,
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            EscalationStrategy::parse("round_robin").unwrap(),
            EscalationStrategy::RoundRobin
        );
        assert_eq!(
            EscalationStrategy::parse("SUPERADMIN_ONLY").unwrap(),
            EscalationStrategy::SuperAdminOnly
        );
        assert!(EscalationStrategy::parse("nonsense").is_err());
    }

    #[test]
    fn test_empty_pool_fails() {
        let result = select_target(EscalationStrategy::FirstAdmin, &[], 0, &mut rng());
        assert!(result.is_err());
    }

    #[test]
    fn test_first_admin() {
        let pool = [admin("a1", "One", 5), admin("a2", "Two", 0)];
        let chosen = select_target(EscalationStrategy::FirstAdmin, &pool, 7, &mut rng()).unwrap();
        assert_eq!(chosen.id, "a1");
    }

    #[test]
    fn test_round_robin_rotates_by_total() {
        let pool = [admin("a1", "One", 0), admin("a2", "Two", 0), admin("a3", "Three", 0)];
        for (total, expected) in [(0, "a1"), (1, "a2"), (2, "a3"), (3, "a1"), (7, "a2")] {
            let chosen =
                select_target(EscalationStrategy::RoundRobin, &pool, total, &mut rng()).unwrap();
            assert_eq!(chosen.id, expected);
        }
    }

    #[test]
    fn test_least_loaded() {
        let pool = [admin("a1", "One", 4), admin("a2", "Two", 1), admin("a3", "Three", 2)];
        let chosen = select_target(EscalationStrategy::LeastLoaded, &pool, 0, &mut rng()).unwrap();
        assert_eq!(chosen.id, "a2");
    }

    #[test]
    fn test_random_stays_in_pool() {
        let pool = [admin("a1", "One", 0), admin("a2", "Two", 0)];
        let mut rng = rng();
        for _ in 0..20 {
            let chosen = select_target(EscalationStrategy::Random, &pool, 0, &mut rng).unwrap();
            assert!(chosen.id == "a1" || chosen.id == "a2");
        }
    }

    #[test]
    fn test_senior_admin_matches_markers() {
        let pool = [
            admin("a1", "Plain Admin", 0),
            admin("a2", "Head of Support", 0),
        ];
        let chosen = select_target(EscalationStrategy::SeniorAdmin, &pool, 0, &mut rng()).unwrap();
        assert_eq!(chosen.id, "a2");
    }

    #[test]
    fn test_senior_admin_matches_email() {
        let mut senior = admin("a2", "Two", 0);
        senior.email = "senior.ops@example.com".to_string();
        let pool = [admin("a1", "One", 0), senior];
        let chosen = select_target(EscalationStrategy::SeniorAdmin, &pool, 0, &mut rng()).unwrap();
        assert_eq!(chosen.id, "a2");
    }

    #[test]
    fn test_senior_admin_falls_back_to_first() {
        let pool = [admin("a1", "One", 0), admin("a2", "Two", 0)];
        let chosen = select_target(EscalationStrategy::SeniorAdmin, &pool, 0, &mut rng()).unwrap();
        assert_eq!(chosen.id, "a1");
    }

    #[test]
    fn test_superadmin_only_prefers_least_loaded_superadmin() {
        let pool = [
            admin("a1", "One", 0),
            superadmin("s1", 3),
            superadmin("s2", 1),
        ];
        let chosen =
            select_target(EscalationStrategy::SuperAdminOnly, &pool, 0, &mut rng()).unwrap();
        assert_eq!(chosen.id, "s2");
    }

    #[test]
    fn test_superadmin_only_falls_back_to_admin() {
        let pool = [admin("a1", "One", 0), admin("a2", "Two", 0)];
        let chosen =
            select_target(EscalationStrategy::SuperAdminOnly, &pool, 0, &mut rng()).unwrap();
        assert_eq!(chosen.id, "a1");
    }
}
