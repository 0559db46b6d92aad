use std::sync::Arc;

use log::{debug, warn};

use crate::quiz::error::{QuizError, Result};
use crate::quiz::{Catalog, Opponent, Question, ScoreDraw, Topic};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    ChoosingTopic,
    ChoosingOpponent,
    Answering,
    Finished,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::ChoosingTopic => "choosing a topic",
            Phase::ChoosingOpponent => "choosing an opponent",
            Phase::Answering => "answering",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub user: u32,
    pub opponent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub fn from_score(score: Score) -> Self {
        match score.user.cmp(&score.opponent) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Outcome::Win => "Victory!",
            Outcome::Loss => "Defeat!",
            Outcome::Draw => "It's a Draw!",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Win => "Congratulations! You've won this battle!",
            Outcome::Loss => "Better luck next time! Keep practicing!",
            Outcome::Draw => "A worthy opponent indeed! Try again to break the tie!",
        }
    }
}

/// One play-through, from topic selection to the battle result.
///
/// Only [`Battle`] mutates a session; everything here is a read accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BattleSession {
    phase: Phase,
    selected_topic: Option<Topic>,
    selected_opponent: Option<Opponent>,
    current_question_index: usize,
    answers_given: Vec<usize>,
    score: Score,
}

impl BattleSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected_topic(&self) -> Option<&Topic> {
        self.selected_topic.as_ref()
    }

    pub fn selected_opponent(&self) -> Option<&Opponent> {
        self.selected_opponent.as_ref()
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn answers_given(&self) -> &[usize] {
        &self.answers_given
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn outcome(&self) -> Result<Outcome> {
        if self.phase != Phase::Finished {
            return Err(QuizError::InvalidTransition {
                action: "decide the outcome",
                phase: self.phase,
            });
        }
        Ok(Outcome::from_score(self.score))
    }
}

/// What happened on a single `submit_answer`, for per-question feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReport {
    pub correct: bool,
    pub correct_option_index: usize,
    pub explanation: String,
    pub opponent_scored: bool,
    pub finished: bool,
}

/// The battle state machine. Each transition either applies fully or
/// returns an error and leaves the session as it was.
pub struct Battle<D> {
    catalog: Arc<Catalog>,
    session: BattleSession,
    draw: D,
}

impl<D: ScoreDraw> Battle<D> {
    pub fn new(catalog: Arc<Catalog>, draw: D) -> Self {
        Self::resume(catalog, BattleSession::new(), draw)
    }

    pub fn resume(catalog: Arc<Catalog>, session: BattleSession, draw: D) -> Self {
        Self {
            catalog,
            session,
            draw,
        }
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    pub fn into_session(self) -> BattleSession {
        self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<()> {
        if self.session.phase == expected {
            return Ok(());
        }
        warn!("Rejected attempt to {} while {}", action, self.session.phase);
        Err(QuizError::InvalidTransition {
            action,
            phase: self.session.phase,
        })
    }

    pub fn select_topic(&mut self, topic: &Topic) -> Result<()> {
        self.expect_phase(Phase::ChoosingTopic, "select a topic")?;
        let topic = self.catalog.topic(topic.id)?.clone();

        debug!("Topic selected: {}", topic.name);
        self.session.selected_topic = Some(topic);
        self.session.phase = Phase::ChoosingOpponent;
        Ok(())
    }

    pub fn select_opponent(&mut self, opponent: &Opponent) -> Result<()> {
        self.expect_phase(Phase::ChoosingOpponent, "select an opponent")?;
        let opponent = self.catalog.opponent(opponent.id)?.clone();

        debug!(
            "Opponent selected: {} ({}% win rate)",
            opponent.name, opponent.win_rate_level
        );
        self.session.selected_opponent = Some(opponent);
        self.session.current_question_index = 0;
        self.session.answers_given.clear();
        self.session.phase = Phase::Answering;
        Ok(())
    }

    /// Questions of the selected topic, in presentation order.
    fn questions(&self) -> Result<&[Question]> {
        let topic = self
            .session
            .selected_topic
            .as_ref()
            .ok_or(QuizError::InvalidTransition {
                action: "look up questions",
                phase: self.session.phase,
            })?;
        self.catalog.questions_for(topic.id)
    }

    pub fn current_question(&self) -> Result<&Question> {
        self.expect_phase(Phase::Answering, "show a question")?;
        let index = self.session.current_question_index;
        self.questions()?
            .get(index)
            .ok_or_else(|| QuizError::InvalidArgument(format!("no question at index {}", index)))
    }

    /// One-based number of the current question and the total, while answering.
    pub fn progress(&self) -> Option<(usize, usize)> {
        if self.session.phase != Phase::Answering {
            return None;
        }
        let total = self.questions().ok()?.len();
        Some((self.session.current_question_index + 1, total))
    }

    pub fn submit_answer(&mut self, option_index: usize) -> Result<AnswerReport> {
        self.expect_phase(Phase::Answering, "submit an answer")?;
        let win_rate_level = match &self.session.selected_opponent {
            Some(opponent) => opponent.win_rate_level,
            None => {
                return Err(QuizError::InvalidTransition {
                    action: "submit an answer without an opponent",
                    phase: self.session.phase,
                })
            }
        };

        let index = self.session.current_question_index;
        let (question, question_count) = {
            let questions = self.questions()?;
            let question = questions.get(index).ok_or_else(|| {
                QuizError::InvalidArgument(format!("no question at index {}", index))
            })?;
            (question.clone(), questions.len())
        };
        if option_index >= question.options.len() {
            return Err(QuizError::InvalidArgument(format!(
                "option {} is out of range for a question with {} options",
                option_index,
                question.options.len()
            )));
        }

        let correct = option_index == question.correct_option_index;
        let opponent_scored = self.draw.draw_percent() < f64::from(win_rate_level);
        let finished = index + 1 >= question_count;

        self.session.answers_given.push(option_index);
        if correct {
            self.session.score.user += 1;
        }
        if opponent_scored {
            self.session.score.opponent += 1;
        }
        if finished {
            self.session.phase = Phase::Finished;
        } else {
            self.session.current_question_index += 1;
        }

        debug!(
            "Question {}/{} answered (correct: {}, opponent scored: {}), score {}:{}",
            index + 1,
            question_count,
            correct,
            opponent_scored,
            self.session.score.user,
            self.session.score.opponent
        );

        Ok(AnswerReport {
            correct,
            correct_option_index: question.correct_option_index,
            explanation: question.explanation,
            opponent_scored,
            finished,
        })
    }

    pub fn reset(&mut self) {
        debug!("Battle reset");
        self.session = BattleSession::new();
    }

    pub fn outcome(&self) -> Result<Outcome> {
        self.session.outcome()
    }
}
