//! End-of-match ranking.
//!
//! Revealed-cell counts are always recomputed from the server-side step
//! log under the reveal-only model, never taken from a submitted snapshot,
//! so every seat of every match is measured by the same rule.
use super::*;
use msr_board::Layout;
use msr_board::Sweep;
use msr_core::ID;
use msr_core::Millis;
use msr_core::Rank;
use msr_core::Unique;
use std::time::SystemTime;

/// One seat's measurable end-of-match record.
#[derive(Debug, Clone)]
pub struct Standing {
    pub seat: ID<Seat>,
    pub outcome: Outcome,
    pub cleared: usize,
    pub duration_ms: Option<Millis>,
    pub steps_count: i32,
    pub finished_at: Option<SystemTime>,
}

/// Replay the step log per seat and measure revealed non-mine cells.
pub fn standings(layout: &Layout, seats: &[Seat], steps: &[Step]) -> Vec<Standing> {
    seats
        .iter()
        .map(|seat| {
            let mut sweep = Sweep::new(layout);
            for step in steps.iter().filter(|s| s.seat() == seat.id()) {
                match step.action() {
                    StepAction::Reveal => sweep.reveal(step.x(), step.y()),
                    StepAction::Chord => sweep.chord(step.x(), step.y()),
                    StepAction::Flag => {}
                }
            }
            Standing {
                seat: seat.id(),
                outcome: seat.result(),
                cleared: sweep.cleared(),
                duration_ms: seat.duration_ms(),
                steps_count: seat.steps_count(),
                finished_at: seat.finished_at(),
            }
        })
        .collect()
}

/// Assign ranks 1..=N, better first.
///
/// Win beats any non-win; forfeit loses to everything regardless of cells.
/// Within a class: more cleared cells, then smaller duration, then fewer
/// steps, then earlier finish.
pub fn rank(standings: &[Standing]) -> Vec<(ID<Seat>, Rank)> {
    let mut ordered: Vec<&Standing> = standings.iter().collect();
    ordered.sort_by_key(|s| key(s));
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, s)| (s.seat, (i + 1) as Rank))
        .collect()
}

fn class(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Win => 0,
        Outcome::Lose | Outcome::Draw | Outcome::None => 1,
        Outcome::Forfeit => 2,
    }
}

fn key(s: &Standing) -> (u8, std::cmp::Reverse<usize>, Millis, i32, Millis) {
    let finished = s
        .finished_at
        .map(|t| {
            t.duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as Millis)
                .unwrap_or(0)
        })
        .unwrap_or(Millis::MAX);
    (
        class(s.outcome),
        std::cmp::Reverse(s.cleared),
        s.duration_ms.unwrap_or(Millis::MAX),
        s.steps_count,
        finished,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn standing(outcome: Outcome, cleared: usize) -> Standing {
        Standing {
            seat: ID::default(),
            outcome,
            cleared,
            duration_ms: Some(5000),
            steps_count: 10,
            finished_at: Some(SystemTime::now()),
        }
    }

    #[test]
    fn win_beats_higher_cleared_loss() {
        let winner = standing(Outcome::Win, 10);
        let loser = standing(Outcome::Lose, 70);
        let ranks = rank(&[loser.clone(), winner.clone()]);
        assert_eq!(ranks[0].0, winner.seat);
        assert_eq!(ranks[0].1, 1);
        assert_eq!(ranks[1], (loser.seat, 2));
    }
    #[test]
    fn cleared_decides_among_losses() {
        let more = standing(Outcome::Lose, 40);
        let less = standing(Outcome::Lose, 12);
        let ranks = rank(&[less.clone(), more.clone()]);
        assert_eq!(ranks[0].0, more.seat);
    }
    #[test]
    fn duration_breaks_cleared_ties() {
        let mut fast = standing(Outcome::Lose, 30);
        fast.duration_ms = Some(4000);
        let mut slow = standing(Outcome::Lose, 30);
        slow.duration_ms = Some(9000);
        let ranks = rank(&[slow.clone(), fast.clone()]);
        assert_eq!(ranks[0].0, fast.seat);
    }
    #[test]
    fn steps_break_duration_ties() {
        let mut few = standing(Outcome::Lose, 30);
        few.steps_count = 8;
        let mut many = standing(Outcome::Lose, 30);
        many.steps_count = 20;
        let ranks = rank(&[many.clone(), few.clone()]);
        assert_eq!(ranks[0].0, few.seat);
    }
    #[test]
    fn earlier_finish_breaks_step_ties() {
        let now = SystemTime::now();
        let mut first = standing(Outcome::Lose, 30);
        first.finished_at = Some(now);
        let mut second = standing(Outcome::Lose, 30);
        second.finished_at = Some(now + Duration::from_secs(2));
        let ranks = rank(&[second.clone(), first.clone()]);
        assert_eq!(ranks[0].0, first.seat);
    }
    #[test]
    fn forfeit_ranks_last_despite_cleared() {
        let forfeited = standing(Outcome::Forfeit, 80);
        let lost = standing(Outcome::Lose, 1);
        let ranks = rank(&[forfeited.clone(), lost.clone()]);
        assert_eq!(ranks[0].0, lost.seat);
        assert_eq!(ranks[1].0, forfeited.seat);
    }
    #[test]
    fn ranks_are_a_permutation() {
        let field = vec![
            standing(Outcome::Win, 71),
            standing(Outcome::Lose, 20),
            standing(Outcome::Forfeit, 50),
            standing(Outcome::Draw, 20),
        ];
        let mut ranks: Vec<Rank> = rank(&field).into_iter().map(|(_, r)| r).collect();
        ranks.sort();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }
    #[test]
    fn missing_duration_ranks_after_recorded() {
        let mut timed = standing(Outcome::Lose, 30);
        timed.duration_ms = Some(60000);
        let mut untimed = standing(Outcome::Lose, 30);
        untimed.duration_ms = None;
        let ranks = rank(&[untimed.clone(), timed.clone()]);
        assert_eq!(ranks[0].0, timed.seat);
    }
    #[test]
    fn replayed_standings_measure_the_log() {
        let layout = Layout::generate(9, 9, 10, "rankreplay");
        let m = Match::create(ID::default(), msr_board::Difficulty::Beginner, "rankreplay".into(), 300);
        let a = Seat::create(m.id(), ID::default(), "a".into());
        let b = Seat::create(m.id(), ID::default(), "b".into());
        let (sx, sy) = layout.safe_start();
        let steps = vec![
            Step::hydrate(m.id(), a.id(), 1, StepAction::Reveal, sx, sy, None, SystemTime::now()),
            Step::hydrate(m.id(), b.id(), 2, StepAction::Flag, 0, 0, None, SystemTime::now()),
        ];
        let standings = standings(&layout, &[a.clone(), b.clone()], &steps);
        let of = |seat: ID<Seat>| standings.iter().find(|s| s.seat == seat).unwrap().cleared;
        assert!(of(a.id()) >= 9);
        assert_eq!(of(b.id()), 0);
    }
}
