//! The governance engine: one owner of all state, one method per operation.
//!
//! Every mutating method takes `&mut self` and is all-or-nothing. Checks and
//! vote planning run first, then the single call into the token ledger,
//! then the infallible bookkeeping writes. A rejected call returns an
//! [`EngineError`] and leaves state, escrow and balances untouched.

use crate::error::{EngineError, EntityRef, GovernanceError, Operation};
use crate::escrow::EscrowEntry;
use crate::params::GovernanceParams;
use crate::proposal::{Proposal, ProposalDraft, ProposalKind, ProposalState};
use crate::quadratic::quadratic_weight;
use crate::state::GovernanceState;
use crate::tally::{Outcome, Tally};
use crate::voting::{plan_quadratic_vote, plan_threshold_vote, VoteChoice, VoteRecord};
use civitas_dao::{Dao, DaoDraft, DaoError};
use civitas_identity::{User, UserProfile};
use civitas_token::{LocalLedger, TokenLedger, TokenMetadata};
use civitas_types::{Clock, DaoId, ProposalId, TokenAmount, TokenRef, UserId, WalletAddress};
use civitas_utils::spans::{escrow_span, operation_span, query_span};
use serde::{Deserialize, Serialize};

/// What an accepted ballot did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub proposal: ProposalId,
    pub user: UserId,
    pub choice: VoteChoice,
    /// Tokens pulled into custody by this call.
    pub pulled: TokenAmount,
    /// Total escrowed for this vote so far.
    pub committed: TokenAmount,
    pub weight: u64,
}

pub struct GovernanceEngine<L, C> {
    params: GovernanceParams,
    state: GovernanceState,
    ledger: L,
    clock: C,
}

impl<L: TokenLedger, C: Clock> GovernanceEngine<L, C> {
    /// Engine over empty state.
    pub fn new(params: GovernanceParams, ledger: L, clock: C) -> Result<Self, GovernanceError> {
        Self::with_state(params, GovernanceState::default(), ledger, clock)
    }

    /// Engine over previously saved state.
    pub fn with_state(
        params: GovernanceParams,
        state: GovernanceState,
        ledger: L,
        clock: C,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            params,
            state,
            ledger,
            clock,
        })
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn state(&self) -> &GovernanceState {
        &self.state
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access, for funding wallets and granting allowances.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_parts(self) -> (GovernanceState, L, C) {
        (self.state, self.ledger, self.clock)
    }

    // ── Identity ───────────────────────────────────────────────────────

    pub fn create_user(
        &mut self,
        profile: UserProfile,
        wallet: &WalletAddress,
    ) -> Result<UserId, EngineError> {
        run(Operation::CreateUser, EntityRef::Wallet(wallet.clone()), || {
            let id = self.state.identity.create_user(profile, wallet.clone())?;
            tracing::info!(user = %id, "user created");
            Ok(id)
        })
    }

    /// The wallet's user id, [`UserId::NONE`] when unregistered.
    pub fn lookup(&self, wallet: &WalletAddress) -> UserId {
        self.state.identity.lookup(wallet)
    }

    pub fn user(&self, id: UserId) -> Result<&User, EngineError> {
        query("user", EntityRef::User(id), || {
            Ok(self.state.identity.user(id)?)
        })
    }

    pub fn total_users(&self) -> u64 {
        self.state.identity.total_users()
    }

    // ── DAOs ───────────────────────────────────────────────────────────

    pub fn create_dao(&mut self, draft: DaoDraft, creator: &WalletAddress) -> Result<DaoId, EngineError> {
        run(Operation::CreateDao, EntityRef::Wallet(creator.clone()), || {
            let id = self
                .state
                .daos
                .create_dao(&mut self.state.identity, draft, creator)?;
            tracing::info!(dao = %id, "dao created");
            Ok(id)
        })
    }

    pub fn join_dao(&mut self, dao: DaoId, wallet: &WalletAddress) -> Result<UserId, EngineError> {
        run(Operation::JoinDao, EntityRef::Dao(dao), || {
            let user = self
                .state
                .daos
                .join_dao(&self.state.identity, &self.ledger, dao, wallet)?;
            tracing::info!(dao = %dao, user = %user, "member joined");
            Ok(user)
        })
    }

    pub fn add_member_to_dao(
        &mut self,
        dao: DaoId,
        member: &WalletAddress,
        admin: &WalletAddress,
    ) -> Result<UserId, EngineError> {
        run(Operation::AddMemberToDao, EntityRef::Dao(dao), || {
            let user = self
                .state
                .daos
                .add_member(&self.state.identity, dao, member, admin)?;
            tracing::info!(dao = %dao, user = %user, admin = %admin, "member added by admin");
            Ok(user)
        })
    }

    pub fn check_membership(&self, dao: DaoId, wallet: &WalletAddress) -> bool {
        self.state
            .daos
            .check_membership(&self.state.identity, dao, wallet)
    }

    /// Members in join order, creator first.
    pub fn get_all_members(&self, dao: DaoId) -> Result<&[UserId], EngineError> {
        query("members", EntityRef::Dao(dao), || Ok(self.state.daos.members(dao)?))
    }

    pub fn dao(&self, id: DaoId) -> Result<&Dao, EngineError> {
        query("dao", EntityRef::Dao(id), || Ok(self.state.daos.dao(id)?))
    }

    pub fn total_daos(&self) -> u64 {
        self.state.daos.total_daos()
    }

    pub fn is_admin(&self, dao: DaoId, wallet: &WalletAddress) -> bool {
        self.state.daos.is_admin(&self.state.identity, dao, wallet)
    }

    /// Quadratic weight the member's current governance-token balance
    /// would carry.
    pub fn voting_power(&self, dao: DaoId, user: UserId) -> Result<u64, EngineError> {
        query("voting_power", EntityRef::Dao(dao), || {
            let record = self.state.daos.dao(dao)?;
            self.state.daos.require_member(dao, user)?;
            let wallet = &self.state.identity.user(user)?.wallet;
            let balance = self.ledger.balance_of(&record.token, wallet);
            Ok(quadratic_weight(balance, &self.params))
        })
    }

    // ── Proposals ──────────────────────────────────────────────────────

    pub fn create_proposal(
        &mut self,
        draft: ProposalDraft,
        proposer: &WalletAddress,
    ) -> Result<ProposalId, EngineError> {
        run(Operation::CreateProposal, EntityRef::Dao(draft.dao), || {
            let dao = self.state.daos.dao(draft.dao)?;
            let user = self.resolve_member(dao.id, proposer)?;
            draft.validate()?;
            if draft.token != dao.token {
                return Err(GovernanceError::TokenMismatch {
                    expected: dao.token.clone(),
                    given: draft.token,
                });
            }
            let available = self.ledger.balance_of(&dao.token, proposer);
            if available < dao.proposing_threshold {
                return Err(GovernanceError::InsufficientBalance {
                    needed: dao.proposing_threshold,
                    available,
                });
            }
            let kind = draft.kind;
            let id = self.state.proposals.insert(draft, user)?;
            tracing::info!(proposal = %id, proposer = %user, %kind, "proposal created");
            Ok(id)
        })
    }

    pub fn proposal(&self, id: ProposalId) -> Result<&Proposal, EngineError> {
        query("proposal", EntityRef::Proposal(id), || {
            self.state.proposals.get(id)
        })
    }

    /// Lifecycle state at the current clock reading.
    pub fn proposal_state(&self, id: ProposalId) -> Result<ProposalState, EngineError> {
        let now = self.clock.now();
        query("proposal_state", EntityRef::Proposal(id), || {
            Ok(self.state.proposals.get(id)?.state(now))
        })
    }

    pub fn total_proposals(&self) -> u64 {
        self.state.proposals.total()
    }

    pub fn proposals_for_dao(&self, dao: DaoId) -> Result<&[ProposalId], EngineError> {
        query("proposals_for_dao", EntityRef::Dao(dao), || {
            self.state.daos.dao(dao)?;
            Ok(self.state.proposals.for_dao(dao))
        })
    }

    // ── Voting ─────────────────────────────────────────────────────────

    /// Threshold ballot: escrows `voting_threshold` and records one unit
    /// of weight on `choice`.
    pub fn vote_for_proposal(
        &mut self,
        id: ProposalId,
        choice: VoteChoice,
        voter: &WalletAddress,
    ) -> Result<VoteReceipt, EngineError> {
        run(Operation::VoteForProposal, EntityRef::Proposal(id), || {
            let user = self.ballot_checks(id, voter, ProposalKind::Threshold)?;
            let proposal = self.state.proposals.get(id)?;
            let record = plan_threshold_vote(proposal, self.state.votes.record(id, user), user, choice)?;
            let (token, amount) = (proposal.token.clone(), proposal.voting_threshold);
            self.commit_ballot(id, user, voter, &token, amount, record)
        })
    }

    /// Quadratic ballot: escrows `amount` on top of any earlier commitment
    /// and recomputes the voter's weight.
    pub fn qv_voting(
        &mut self,
        id: ProposalId,
        amount: TokenAmount,
        voter: &WalletAddress,
        choice: VoteChoice,
    ) -> Result<VoteReceipt, EngineError> {
        run(Operation::QvVoting, EntityRef::Proposal(id), || {
            let user = self.ballot_checks(id, voter, ProposalKind::Quadratic)?;
            let proposal = self.state.proposals.get(id)?;
            let record = plan_quadratic_vote(
                proposal,
                self.state.votes.record(id, user),
                user,
                choice,
                amount,
                &self.params,
            )?;
            let token = proposal.token.clone();
            self.commit_ballot(id, user, voter, &token, amount, record)
        })
    }

    pub fn yes_voters(&self, id: ProposalId) -> Result<&[UserId], EngineError> {
        query("yes_voters", EntityRef::Proposal(id), || {
            self.state.proposals.get(id)?;
            Ok(self
                .state
                .votes
                .votes(id)
                .map(|v| v.yes_voters())
                .unwrap_or_default())
        })
    }

    pub fn no_voters(&self, id: ProposalId) -> Result<&[UserId], EngineError> {
        query("no_voters", EntityRef::Proposal(id), || {
            self.state.proposals.get(id)?;
            Ok(self
                .state
                .votes
                .votes(id)
                .map(|v| v.no_voters())
                .unwrap_or_default())
        })
    }

    /// Weight the user carries on a quadratic proposal, 0 if they have not
    /// voted.
    pub fn quadratic_weight(&self, id: ProposalId, user: UserId) -> Result<u64, EngineError> {
        query("quadratic_weight", EntityRef::Proposal(id), || {
            let proposal = self.state.proposals.get(id)?;
            if proposal.kind != ProposalKind::Quadratic {
                return Err(GovernanceError::WrongVotingMode {
                    proposal: id,
                    kind: proposal.kind,
                });
            }
            Ok(self
                .state
                .votes
                .record(id, user)
                .map_or(0, |r| r.weight))
        })
    }

    pub fn vote_record(&self, id: ProposalId, user: UserId) -> Result<Option<&VoteRecord>, EngineError> {
        query("vote_record", EntityRef::Proposal(id), || {
            self.state.proposals.get(id)?;
            Ok(self.state.votes.record(id, user))
        })
    }

    pub fn escrow_entry(&self, id: ProposalId, user: UserId) -> Option<&EscrowEntry> {
        self.state.escrow.entry(id, user)
    }

    /// Running totals; available in every state.
    pub fn tally(&self, id: ProposalId) -> Result<Tally, EngineError> {
        query("tally", EntityRef::Proposal(id), || {
            let proposal = self.state.proposals.get(id)?;
            Ok(self.state.votes.tally(proposal))
        })
    }

    // ── Finalization ───────────────────────────────────────────────────

    /// Record the outcome once voting has ended. Irreversible.
    pub fn finalize_proposal(&mut self, id: ProposalId) -> Result<Outcome, EngineError> {
        let now = self.clock.now();
        run(Operation::FinalizeProposal, EntityRef::Proposal(id), || {
            let proposal = self.state.proposals.get(id)?;
            if proposal.is_finalized() {
                return Err(GovernanceError::AlreadyFinalized(id));
            }
            if now < proposal.end {
                return Err(GovernanceError::VotingStillActive {
                    proposal: id,
                    ends: proposal.end,
                });
            }
            let tally = self.state.votes.tally(proposal);
            let outcome = Outcome {
                passed: tally.passes(proposal.passing_threshold),
                tally,
                finalized_at: now,
            };
            self.state.proposals.finalize(id, outcome)?;
            tracing::info!(
                proposal = %id,
                passed = outcome.passed,
                yes = tally.yes,
                no = tally.no,
                "proposal finalized"
            );
            Ok(outcome)
        })
    }

    pub fn get_proposal_result(&self, id: ProposalId) -> Result<bool, EngineError> {
        query("proposal_result", EntityRef::Proposal(id), || {
            self.state
                .proposals
                .get(id)?
                .result()
                .ok_or(GovernanceError::NotFinalized(id))
        })
    }

    /// Return a finalized proposal's escrowed commitment to the voter.
    pub fn release_commitment(
        &mut self,
        id: ProposalId,
        voter: &WalletAddress,
    ) -> Result<TokenAmount, EngineError> {
        run(Operation::ReleaseCommitment, EntityRef::Proposal(id), || {
            if !self.state.proposals.get(id)?.is_finalized() {
                return Err(GovernanceError::NotFinalized(id));
            }
            let user = self
                .state
                .identity
                .find(voter)
                .ok_or(GovernanceError::NothingToRelease {
                    proposal: id,
                    user: UserId::NONE,
                })?;
            let entry = self.state.escrow.releasable(id, user)?.clone();
            {
                let span = escrow_span("release", entry.token.as_str(), entry.amount.raw());
                let _guard = span.enter();
                self.ledger
                    .transfer(&entry.token, &self.params.custody, &entry.owner, entry.amount)
                    .inspect_err(|e| tracing::warn!(error = %e, "escrow release failed"))?;
            }
            self.state.escrow.mark_released(id, user);
            tracing::info!(proposal = %id, user = %user, amount = entry.amount.raw(), "commitment released");
            Ok(entry.amount)
        })
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Registered wallet that is a member of `dao`. Unregistered wallets
    /// are reported as [`UserId::NONE`].
    fn resolve_member(&self, dao: DaoId, wallet: &WalletAddress) -> Result<UserId, GovernanceError> {
        let user = self
            .state
            .identity
            .find(wallet)
            .ok_or(DaoError::NotMember {
                dao,
                user: UserId::NONE,
            })?;
        self.state.daos.require_member(dao, user)?;
        Ok(user)
    }

    fn ballot_checks(
        &self,
        id: ProposalId,
        voter: &WalletAddress,
        kind: ProposalKind,
    ) -> Result<UserId, GovernanceError> {
        let proposal = self.state.proposals.get(id)?;
        if proposal.kind != kind {
            return Err(GovernanceError::WrongVotingMode {
                proposal: id,
                kind: proposal.kind,
            });
        }
        let state = proposal.state(self.clock.now());
        if state != ProposalState::Active {
            return Err(GovernanceError::VotingClosed { proposal: id, state });
        }
        self.resolve_member(proposal.dao, voter)
    }

    /// Pull `amount` into custody, then record the planned ballot.
    fn commit_ballot(
        &mut self,
        id: ProposalId,
        user: UserId,
        voter: &WalletAddress,
        token: &TokenRef,
        amount: TokenAmount,
        record: VoteRecord,
    ) -> Result<VoteReceipt, GovernanceError> {
        if !amount.is_zero() {
            let span = escrow_span("pull", token.as_str(), amount.raw());
            let _guard = span.enter();
            let custody = &self.params.custody;
            self.ledger
                .transfer_from(token, custody, voter, custody, amount)
                .inspect_err(|e| tracing::warn!(error = %e, voter = %voter, "escrow pull failed"))?;
        }
        self.state.escrow.lock(id, user, voter, token, amount);
        self.state.votes.apply(id, user, record);
        tracing::info!(
            proposal = %id,
            user = %user,
            choice = %record.choice,
            weight = record.weight,
            committed = record.committed.raw(),
            "vote recorded"
        );
        Ok(VoteReceipt {
            proposal: id,
            user,
            choice: record.choice,
            pulled: amount,
            committed: record.committed,
            weight: record.weight,
        })
    }
}

/// Token factory, available when the engine runs over the in-process ledger.
impl<C: Clock> GovernanceEngine<LocalLedger, C> {
    /// Deploy a governance token for `creator` and credit the initial
    /// supply to their wallet.
    pub fn deploy_token(
        &mut self,
        name: &str,
        symbol: &str,
        initial_supply: TokenAmount,
        creator: UserId,
    ) -> Result<TokenRef, EngineError> {
        run(Operation::DeployToken, EntityRef::User(creator), || {
            let wallet = &self.state.identity.user(creator)?.wallet;
            Ok(self
                .ledger
                .deploy_token(name, symbol, initial_supply, creator, wallet)?)
        })
    }

    /// Tokens `creator` deployed, oldest first.
    pub fn tokens_deployed_by(&self, creator: UserId) -> &[TokenRef] {
        self.ledger.tokens_deployed_by(creator)
    }

    pub fn token_metadata(&self, token: &TokenRef) -> Option<&TokenMetadata> {
        self.ledger.token_metadata(token)
    }
}

/// Run a mutating operation inside its span and attach the operation and
/// entity to a rejection.
fn run<T>(
    op: Operation,
    entity: EntityRef,
    f: impl FnOnce() -> Result<T, GovernanceError>,
) -> Result<T, EngineError> {
    let span = operation_span(op.as_str(), &entity.to_string());
    let _guard = span.enter();
    f().map_err(|reason| {
        tracing::debug!(category = %reason.category(), %reason, "rejected");
        EngineError { op, entity, reason }
    })
}

fn query<T>(
    name: &'static str,
    entity: EntityRef,
    f: impl FnOnce() -> Result<T, GovernanceError>,
) -> Result<T, EngineError> {
    let span = query_span(name, &entity.to_string());
    let _guard = span.enter();
    f().map_err(|reason| EngineError {
        op: Operation::Query,
        entity,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_token::LocalLedger;
    use civitas_types::SystemClock;

    #[test]
    fn test_invalid_params_rejected() {
        let params = GovernanceParams {
            qv_max_weight: 0,
            ..Default::default()
        };
        assert!(matches!(
            GovernanceEngine::new(params, LocalLedger::new(), SystemClock),
            Err(GovernanceError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_errors_name_operation_and_entity() {
        let engine =
            GovernanceEngine::new(GovernanceParams::default(), LocalLedger::new(), SystemClock).unwrap();
        let err = engine.proposal(ProposalId::new(9)).unwrap_err();
        assert_eq!(err.op, Operation::Query);
        assert_eq!(err.entity, EntityRef::Proposal(ProposalId::new(9)));
        assert_eq!(err.to_string(), "query on proposal#9 failed: proposal#9 not found");
    }
}
