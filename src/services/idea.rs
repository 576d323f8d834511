use crate::error::Result;
use crate::models::{BookConcept, HeadReply, Role, Termination, TextReply, Transcript};
use crate::services::llm::{Session, SessionFactory};
use crate::services::prompts::{self, RoundContext};

pub const THINKERS: u8 = 3;

#[derive(Debug, Clone)]
pub struct Negotiated {
    pub concept: BookConcept,
    pub termination: Termination,
    pub transcript: Transcript,
}

/// Runs the Head and three Thinkers until the Head confirms a concept or
/// `max_rounds` rounds have passed, then extracts the final `BookConcept`.
pub async fn negotiate_idea(
    agents: &SessionFactory,
    custom_prompt: &str,
    max_rounds: u32,
) -> Result<Negotiated> {
    let mut head = agents.open(Role::Head, prompts::IDEA_HEAD).await?;
    let mut thinkers: Vec<Session> = Vec::with_capacity(THINKERS as usize);
    for n in 1..=THINKERS {
        thinkers.push(
            agents
                .open(Role::Thinker(n), &prompts::thinker_instructions(n))
                .await?,
        );
    }

    let mut history = Transcript::new();
    let opening: HeadReply = head.send(&prompts::idea_opening(custom_prompt)).await?;
    history.push(Role::Head, opening.response);

    for round in 1..=max_rounds {
        tracing::debug!(round, max_rounds, "negotiation round");

        for thinker in thinkers.iter_mut() {
            let prompt = prompts::idea_thinker(RoundContext {
                round,
                max_rounds,
                history: &history,
            });
            let reply: TextReply = thinker.send(&prompt).await?;
            history.push(thinker.role(), reply.response);
        }

        let prompt = prompts::idea_review(RoundContext {
            round,
            max_rounds,
            history: &history,
        });
        let review: HeadReply = head.send(&prompt).await?;
        history.push(Role::Head, review.response);

        if review.is_book_idea_confirmed {
            let prompt = prompts::idea_final(RoundContext {
                round,
                max_rounds,
                history: &history,
            });
            let concept: BookConcept = head.send(&prompt).await?;
            tracing::info!(round, title = %concept.title, "book idea confirmed");
            return Ok(Negotiated {
                concept,
                termination: Termination::Confirmed { round },
                transcript: history,
            });
        }
    }

    let prompt = prompts::idea_forced(RoundContext {
        round: max_rounds,
        max_rounds,
        history: &history,
    });
    let concept: BookConcept = head.send(&prompt).await?;
    tracing::warn!(rounds = max_rounds, title = %concept.title, "book idea forced after round cap");
    Ok(Negotiated {
        concept,
        termination: Termination::ForcedClose { rounds: max_rounds },
        transcript: history,
    })
}
