//! Static content catalog: the scripted screens the timing core plays.
//!
//! Everything here is prop data for the terminal - stage scripts, override
//! codes, mock school records. None of it is real.

use indoc::indoc;
use serde::Serialize;

use crate::sequence::{LogLine, Stage};

/// Gap between consecutive log reveals within a scripted stage.
pub const LOG_REVEAL_STAGGER_MS: u64 = 400;

/// The one override code the access panel accepts.
pub const CORRECT_CODE: &str = "PANDA-OVERRIDE-9X7-ACCESS";

/// Banner shown while danger mode is active.
pub const DANGER_ALERT_LINES: [&str; 2] = [
    "!!! SECURITY SPIKE DETECTED !!!",
    "!!! SIMULATION MODE ACTIVE !!!",
];

/// Decoy codes shown to the operator. None of them work.
pub const FAKE_CODES: [&str; 6] = [
    "OVERRIDE-77X-PROTOCOL",
    "NODEKEY-ALPHA-4921",
    "SIGMA-LAYER-90B-ENTRY",
    "GATE-ACCESS-0041A",
    "QUANTUM-KEY-MK900",
    "HYPERCODE-RED-552",
];

pub const FIREWALL_ASCII: &str = indoc! {"
       ⦿⦿⦿⦿⦿⦿⦿
     ⦿           ⦿
    ⦿   ████████   ⦿
    ⦿   █ FIRE █   ⦿
    ⦿   █ WALL █   ⦿
    ⦿   ████████   ⦿
     ⦿           ⦿
       ⦿⦿⦿⦿⦿⦿⦿
"};

pub const KENYA_MAP_ASCII: &str = indoc! {r#"
            ____
         .-"    "-.
       .'  K E N Y A  '.
      /  SCAN IN PROG   \
     |  • NAIROBI NODE    |
     |  • ELDORET NODE    |
      \                  /
       '.              .'
         "-._____.-"
"#};

fn scripted_stage(title: &str, logs: &[&str], duration_ms: u64, effects: &[&str]) -> Stage {
    Stage {
        title: title.to_string(),
        log_lines: logs
            .iter()
            .enumerate()
            .map(|(i, log)| LogLine::new(*log, i as u64 * LOG_REVEAL_STAGGER_MS))
            .collect(),
        duration_ms,
        effects: effects.iter().map(|e| e.to_string()).collect(),
    }
}

/// The six stages of the "hacking" cutscene.
pub fn hacking_stages() -> Vec<Stage> {
    vec![
        scripted_stage(
            "SYSTEM IGNITION",
            &[
                "> Booting Quantum Shell…",
                "> Linking Synapse Nodes…",
                "> Loading Visual Neural Interface…",
            ],
            2000,
            &[],
        ),
        scripted_stage(
            "DATA TUNNEL ACTIVE",
            &[
                "> Engaging Data-Tunnel Renderer…",
                "> Velocity: 9,421 LINES/SEC",
                "> Hyperloop: ACTIVE",
            ],
            3000,
            &["tunnel"],
        ),
        scripted_stage(
            "FIREWALL DETECTED",
            &[
                ">>> FIREWALL TIER-4 DETECTED",
                ">>> STRUCTURE: HEX-QUANTUM BARRIER",
            ],
            2500,
            &["firewall"],
        ),
        scripted_stage(
            "CODE BREAKER DEPLOYED",
            &[
                "> Deploying CODE-BREAKER PACK A…",
                "> Sending PULSE_SHOCK…",
                "> Sending QUANTUM_DRILL…",
                "> Sending SHADOW_INVERT…",
            ],
            2000,
            &[],
        ),
        scripted_stage(
            "FIREWALL DESTROYED",
            &[
                ">>> FIREWALL INTEGRITY: 11%",
                ">>> FIREWALL INTEGRITY: 03%",
                ">>> FIREWALL DESTROYED",
            ],
            2000,
            &[],
        ),
        scripted_stage(
            "KENYA MAP SCAN",
            &[
                "> Mapping National School Registry…",
                "> Loading Mock KNEC Dataset Layers…",
            ],
            3000,
            &["map"],
        ),
    ]
}

/// One chained phase of the access panel's authentication theater.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AuthPhase {
    pub target_pct: f64,
    pub duration_ms: u64,
    pub log: &'static str,
}

/// The access panel's progress phases, run back to back. Each phase settles
/// at its target before the next begins; its log line prints as it settles.
pub fn auth_phases() -> Vec<AuthPhase> {
    vec![
        AuthPhase {
            target_pct: 12.0,
            duration_ms: 300,
            log: "> Verifying input sequence...",
        },
        AuthPhase {
            target_pct: 35.0,
            duration_ms: 400,
            log: "> Cross-referencing cipher blocks...",
        },
        AuthPhase {
            target_pct: 68.0,
            duration_ms: 500,
            log: "> Quantum signature analysis...",
        },
        AuthPhase {
            target_pct: 92.0,
            duration_ms: 400,
            log: "> Finalizing authentication...",
        },
    ]
}

/// Denial log pair for a failed attempt, escalating with the attempt count.
pub fn denial_lines(attempt: u32) -> [String; 2] {
    match attempt {
        1 => [
            "!!! ERROR: INVALID ACCESS CODE".to_string(),
            "!!! ACCESS DENIED (01)".to_string(),
        ],
        2 => [
            "!!! CRITICAL MISMATCH".to_string(),
            "!!! ACCESS DENIED (02)".to_string(),
        ],
        n => [
            "!!! OVERRIDE FAILURE".to_string(),
            format!("!!! ACCESS DENIED (0{})", n.min(9)),
        ],
    }
}

/// Cadence of the exploit lab's output feed.
pub const EXPLOIT_LINE_INTERVAL_MS: u64 = 300;

/// The exploit lab's canned output feed.
pub fn exploit_run_lines() -> Vec<&'static str> {
    vec![
        "> Initializing exploit framework...",
        "> Loading payload modules...",
        "> Establishing secure tunnel...",
        "> Target acquired: 192.168.1.100",
        "> Running vulnerability scan...",
        "> [!] Found open port: 22 (SSH)",
        "> [!] Found open port: 80 (HTTP)",
        "> [!] Found open port: 443 (HTTPS)",
        "> Attempting authentication bypass...",
        "> [*] Injecting payload...",
        "> [+] Payload delivered successfully",
        "> Extracting data packets...",
        "> [*] 256 records retrieved",
        "> Cleaning traces...",
        "> [+] Operation complete",
    ]
}

/// Build the exploit feed as a single playable stage, one line per interval.
pub fn exploit_run_stage() -> Stage {
    let lines = exploit_run_lines();
    let duration_ms = lines.len() as u64 * EXPLOIT_LINE_INTERVAL_MS;
    Stage {
        title: "EXPLOIT DEVELOPMENT LAB".to_string(),
        log_lines: lines
            .iter()
            .enumerate()
            .map(|(i, line)| LogLine::new(*line, i as u64 * EXPLOIT_LINE_INTERVAL_MS))
            .collect(),
        duration_ms,
        effects: Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct School {
    pub name: &'static str,
    pub code: &'static str,
    pub region: &'static str,
}

/// The mock national school list.
pub fn schools() -> Vec<School> {
    vec![
        School { name: "Alliance High", code: "ALH-001", region: "Kikuyu" },
        School { name: "Mangu High", code: "MNG-002", region: "Thika" },
        School { name: "Starehe Boys", code: "STB-003", region: "Nairobi" },
        School { name: "Kenya High", code: "KNH-004", region: "Nairobi" },
        School { name: "Pangani Girls", code: "PGG-005", region: "Nairobi" },
        School { name: "Maseno School", code: "MSN-006", region: "Kisumu" },
        School { name: "Maryhill Girls", code: "MRY-007", region: "Thika" },
        School { name: "Lenana School", code: "LEN-008", region: "Nairobi" },
        School { name: "Kapsabet Boys", code: "KPS-009", region: "Nandi" },
        School { name: "Moi Forces Academy", code: "MFA-010", region: "Nairobi" },
    ]
}

pub fn find_school(code_or_name: &str) -> Option<School> {
    let needle = code_or_name.to_uppercase();
    schools().into_iter().find(|s| {
        s.code.eq_ignore_ascii_case(&needle) || s.name.to_uppercase().contains(&needle)
    })
}

/// The school query's log-reveal script as a playable stage: four query
/// lines at the reveal stagger, then the placeholder verdict after a beat.
pub fn school_query_stage(school: &School) -> Stage {
    let mut log_lines: Vec<LogLine> = [
        format!("> Opening {}…", school.name),
        format!("> Query: MOCK_EXAM_DATA_{}", school.code),
        format!("> Scanning regional node: {}…", school.region),
        "> Checking data availability…".to_string(),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, text)| LogLine::new(text, (i as u64 + 1) * LOG_REVEAL_STAGGER_MS))
    .collect();

    let verdict_at = 4 * LOG_REVEAL_STAGGER_MS + 500;
    log_lines.push(LogLine::new("NO DATA YET", verdict_at));
    log_lines.push(LogLine::new(
        "Will be added soon (Mock Placeholder)",
        verdict_at + 1,
    ));

    Stage {
        title: format!("MOCK KNEC NATIONAL SCHOOLS :: {}", school.code),
        duration_ms: verdict_at + 400,
        log_lines,
        effects: Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExamType {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The examination catalog of the mock results portal.
pub fn exam_types() -> Vec<ExamType> {
    vec![
        ExamType {
            code: "KPSEA",
            name: "Kenya Primary School Education Assessment",
            description: "Grade 6 Assessment",
        },
        ExamType {
            code: "KJSEA",
            name: "Kenya Junior School Education Assessment",
            description: "Grade 9 Assessment",
        },
        ExamType {
            code: "KCSE",
            name: "Kenya Certificate of Secondary Education",
            description: "Form 4 National Exam",
        },
        ExamType {
            code: "QT",
            name: "KCSE Qualifying Test",
            description: "Qualifying Examination",
        },
        ExamType {
            code: "SBA",
            name: "School-Based Assessments",
            description: "Continuous Assessment",
        },
    ]
}

pub fn find_exam(code: &str) -> Option<ExamType> {
    exam_types()
        .into_iter()
        .find(|e| e.code.eq_ignore_ascii_case(code))
}

/// Years the portal offers.
pub const RESULT_YEAR_MIN: i32 = 1996;
pub const RESULT_YEAR_MAX: i32 = 2025;
/// The year whose results are "not yet released".
pub const UNRELEASED_YEAR: i32 = 2025;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hacking_stages_have_staggered_strictly_increasing_offsets() {
        for stage in hacking_stages() {
            let offsets: Vec<u64> = stage.log_lines.iter().map(|l| l.offset_ms).collect();
            assert!(offsets.windows(2).all(|w| w[0] < w[1]), "{}", stage.title);
            assert!(offsets.first().map_or(true, |o| *o == 0));
            assert!(stage.duration_ms > 0);
        }
    }

    #[test]
    fn cutscene_total_duration_is_14500_ms() {
        assert_eq!(Stage::total_duration_ms(&hacking_stages()), 14_500);
    }

    #[test]
    fn auth_phases_have_ascending_targets() {
        let phases = auth_phases();
        assert!(phases.windows(2).all(|w| w[0].target_pct < w[1].target_pct));
        assert!(phases.last().unwrap().target_pct < 100.0);
    }

    #[test]
    fn school_lookup_matches_code_and_name() {
        assert_eq!(find_school("alh-001").unwrap().name, "Alliance High");
        assert_eq!(find_school("Maseno").unwrap().code, "MSN-006");
        assert!(find_school("HOGWARTS").is_none());
    }

    #[test]
    fn school_query_stage_offsets_strictly_increase() {
        let stage = school_query_stage(&schools()[0]);
        let offsets: Vec<u64> = stage.log_lines.iter().map(|l| l.offset_ms).collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        assert!(stage.duration_ms > *offsets.last().unwrap());
    }

    #[test]
    fn correct_code_is_not_among_the_decoys() {
        assert!(!FAKE_CODES.contains(&CORRECT_CODE));
    }
}
