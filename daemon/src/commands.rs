//! Subcommands and their execution against the engine.

use crate::workspace::CliEngine;
use civitas_dao::DaoDraft;
use civitas_governance::{ProposalDraft, ProposalKind, VoteChoice};
use civitas_identity::UserProfile;
use civitas_token::TokenLedger;
use civitas_types::{
    Clock, DaoId, ProposalId, Timestamp, TokenAmount, TokenRef, UserId, WalletAddress,
};
use civitas_utils::format_duration;
use clap::Subcommand;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Default voting window when neither `--end` nor `--duration` is given.
const DEFAULT_VOTING_SECS: u64 = 7 * 24 * 3600;

#[derive(Subcommand)]
pub enum Command {
    /// Register a wallet as a user.
    CreateUser {
        #[arg(long)]
        wallet: WalletAddress,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        profile_uri: String,
    },

    /// List every registered user.
    Users,

    /// Print the user id of a wallet (0 when unregistered).
    Lookup {
        #[arg(long)]
        wallet: WalletAddress,
    },

    /// Create a DAO; the creator becomes its first admin.
    CreateDao {
        #[arg(long)]
        creator: WalletAddress,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Minimum token balance (raw) to self-join.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        joining_threshold: i128,
        /// Minimum token balance (raw) to create proposals.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        proposing_threshold: i128,
        #[arg(long)]
        token: TokenRef,
        #[arg(long)]
        private: bool,
    },

    /// Join a public DAO.
    JoinDao {
        #[arg(long)]
        dao: u64,
        #[arg(long)]
        wallet: WalletAddress,
    },

    /// Add a member to a DAO as one of its admins.
    AddMember {
        #[arg(long)]
        dao: u64,
        #[arg(long)]
        member: WalletAddress,
        #[arg(long)]
        admin: WalletAddress,
    },

    /// List a DAO's members in join order.
    Members {
        #[arg(long)]
        dao: u64,
    },

    /// Check whether a wallet is a member of a DAO.
    CheckMembership {
        #[arg(long)]
        dao: u64,
        #[arg(long)]
        wallet: WalletAddress,
    },

    /// Create tokens on the local ledger.
    Mint {
        #[arg(long)]
        token: TokenRef,
        #[arg(long)]
        to: WalletAddress,
        /// Raw amount, or whole tokens with a `t` suffix (e.g. `25t`).
        #[arg(long)]
        amount: TokenAmount,
    },

    /// Deploy a governance token; the creator receives the initial supply.
    DeployToken {
        #[arg(long)]
        name: String,
        /// Ticker, used as the token reference.
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "0")]
        supply: TokenAmount,
        /// User id of the creator.
        #[arg(long)]
        creator: u64,
    },

    /// Tokens a user has deployed, oldest first.
    DeployedTokens {
        #[arg(long)]
        user: u64,
    },

    /// Allow the custody wallet to pull tokens for votes.
    Approve {
        #[arg(long)]
        token: TokenRef,
        #[arg(long)]
        owner: WalletAddress,
        #[arg(long)]
        amount: TokenAmount,
    },

    Balance {
        #[arg(long)]
        token: TokenRef,
        #[arg(long)]
        wallet: WalletAddress,
    },

    /// Create a proposal in a DAO.
    CreateProposal {
        /// 1 = threshold, 2 = quadratic.
        #[arg(long = "type")]
        kind: u8,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Tokens locked per threshold vote.
        #[arg(long, default_value = "0")]
        voting_threshold: TokenAmount,
        #[arg(long)]
        dao: u64,
        #[arg(long)]
        token: TokenRef,
        #[arg(long)]
        proposer: WalletAddress,
        /// Voting start (unix seconds); defaults to now.
        #[arg(long)]
        begin: Option<u64>,
        /// Voting end (unix seconds); defaults to begin + duration.
        #[arg(long)]
        end: Option<u64>,
        #[arg(long, default_value_t = DEFAULT_VOTING_SECS)]
        duration: u64,
        /// Percentage of cast votes needed to pass.
        #[arg(long, default_value_t = 50)]
        passing_threshold: u8,
        #[arg(long)]
        vote_once: bool,
    },

    /// Cast a threshold vote.
    Vote {
        #[arg(long)]
        proposal: u64,
        /// 1 = yes, 2 = no.
        #[arg(long)]
        choice: u8,
        #[arg(long)]
        voter: WalletAddress,
    },

    /// Commit tokens to a quadratic vote.
    QvVote {
        #[arg(long)]
        proposal: u64,
        #[arg(long)]
        amount: TokenAmount,
        #[arg(long)]
        voter: WalletAddress,
        /// 1 = yes, 2 = no.
        #[arg(long)]
        choice: u8,
    },

    /// Record the outcome of a proposal whose voting has ended.
    Finalize {
        #[arg(long)]
        proposal: u64,
    },

    /// Print the recorded outcome of a finalized proposal.
    Result {
        #[arg(long)]
        proposal: u64,
    },

    /// Return a voter's escrowed tokens after finalization.
    Release {
        #[arg(long)]
        proposal: u64,
        #[arg(long)]
        voter: WalletAddress,
    },

    /// Quadratic weight a member's current balance would carry.
    VotingPower {
        #[arg(long)]
        dao: u64,
        #[arg(long)]
        user: u64,
    },

    ShowUser {
        #[arg(long)]
        id: u64,
    },

    ShowDao {
        #[arg(long)]
        id: u64,
    },

    /// Proposal details with its current state and running tally.
    ShowProposal {
        #[arg(long)]
        id: u64,
    },

    /// Totals across users, DAOs, proposals, votes and deployed tokens.
    Stats,
}

impl Command {
    /// Whether a successful run changes persisted state.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Self::CreateUser { .. }
                | Self::CreateDao { .. }
                | Self::JoinDao { .. }
                | Self::AddMember { .. }
                | Self::Mint { .. }
                | Self::DeployToken { .. }
                | Self::Approve { .. }
                | Self::CreateProposal { .. }
                | Self::Vote { .. }
                | Self::QvVote { .. }
                | Self::Finalize { .. }
                | Self::Release { .. }
        )
    }

    pub fn run(self, engine: &mut CliEngine) -> anyhow::Result<Value> {
        let output = match self {
            Self::CreateUser {
                wallet,
                name,
                email,
                description,
                profile_uri,
            } => {
                let profile = UserProfile {
                    name,
                    email,
                    description,
                    profile_uri,
                };
                json!({ "user": engine.create_user(profile, &wallet)? })
            }
            Self::Users => {
                let users: Vec<Value> = engine
                    .state()
                    .identity
                    .users()
                    .map(|user| json!({ "id": user.id, "wallet": user.wallet, "name": user.profile.name }))
                    .collect();
                json!({ "users": users })
            }
            Self::Lookup { wallet } => json!({ "user": engine.lookup(&wallet) }),
            Self::CreateDao {
                creator,
                name,
                description,
                joining_threshold,
                proposing_threshold,
                token,
                private,
            } => {
                let draft = DaoDraft {
                    name,
                    description,
                    joining_threshold,
                    proposing_threshold,
                    token,
                    is_private: private,
                };
                json!({ "dao": engine.create_dao(draft, &creator)? })
            }
            Self::JoinDao { dao, wallet } => {
                json!({ "user": engine.join_dao(DaoId::new(dao), &wallet)? })
            }
            Self::AddMember { dao, member, admin } => {
                json!({ "user": engine.add_member_to_dao(DaoId::new(dao), &member, &admin)? })
            }
            Self::Members { dao } => {
                json!({ "members": engine.get_all_members(DaoId::new(dao))? })
            }
            Self::CheckMembership { dao, wallet } => {
                json!({ "member": engine.check_membership(DaoId::new(dao), &wallet) })
            }
            Self::Mint { token, to, amount } => {
                engine.ledger_mut().mint(&token, &to, amount)?;
                json!({ "balance": engine.ledger().balance_of(&token, &to) })
            }
            Self::DeployToken {
                name,
                symbol,
                supply,
                creator,
            } => {
                let creator = UserId::new(creator);
                let token = engine.deploy_token(&name, &symbol, supply, creator)?;
                json!({
                    "token": token,
                    "deployed_by_creator": engine.tokens_deployed_by(creator).len(),
                })
            }
            Self::DeployedTokens { user } => {
                let tokens: Vec<Value> = engine
                    .tokens_deployed_by(UserId::new(user))
                    .iter()
                    .filter_map(|token| engine.token_metadata(token))
                    .map(|meta| json!({ "token": meta.token, "name": meta.name, "initial_supply": meta.initial_supply }))
                    .collect();
                json!({ "tokens": tokens })
            }
            Self::Approve {
                token,
                owner,
                amount,
            } => {
                let custody = engine.params().custody.clone();
                engine.ledger_mut().approve(&token, &owner, &custody, amount);
                json!({ "spender": custody, "allowance": amount })
            }
            Self::Balance { token, wallet } => {
                json!({ "balance": engine.ledger().balance_of(&token, &wallet) })
            }
            Self::CreateProposal {
                kind,
                title,
                description,
                voting_threshold,
                dao,
                token,
                proposer,
                begin,
                end,
                duration,
                passing_threshold,
                vote_once,
            } => {
                let begin = begin
                    .map(Timestamp::new)
                    .unwrap_or_else(|| engine.clock().now());
                let end = end
                    .map(Timestamp::new)
                    .unwrap_or_else(|| begin.saturating_add_secs(duration));
                let draft = ProposalDraft {
                    kind: ProposalKind::try_from(kind)?,
                    title,
                    description,
                    voting_threshold,
                    dao: DaoId::new(dao),
                    token,
                    begin,
                    end,
                    passing_threshold,
                    vote_once,
                };
                json!({ "proposal": engine.create_proposal(draft, &proposer)? })
            }
            Self::Vote {
                proposal,
                choice,
                voter,
            } => {
                let choice = VoteChoice::try_from(choice)?;
                serde_json::to_value(engine.vote_for_proposal(ProposalId::new(proposal), choice, &voter)?)?
            }
            Self::QvVote {
                proposal,
                amount,
                voter,
                choice,
            } => {
                let choice = VoteChoice::try_from(choice)?;
                serde_json::to_value(engine.qv_voting(ProposalId::new(proposal), amount, &voter, choice)?)?
            }
            Self::Finalize { proposal } => {
                serde_json::to_value(engine.finalize_proposal(ProposalId::new(proposal))?)?
            }
            Self::Result { proposal } => {
                json!({ "passed": engine.get_proposal_result(ProposalId::new(proposal))? })
            }
            Self::Release { proposal, voter } => {
                json!({ "released": engine.release_commitment(ProposalId::new(proposal), &voter)? })
            }
            Self::VotingPower { dao, user } => {
                json!({ "weight": engine.voting_power(DaoId::new(dao), UserId::new(user))? })
            }
            Self::ShowUser { id } => serde_json::to_value(engine.user(UserId::new(id))?)?,
            Self::ShowDao { id } => serde_json::to_value(engine.dao(DaoId::new(id))?)?,
            Self::ShowProposal { id } => show_proposal(engine, ProposalId::new(id))?,
            Self::Stats => stats(engine),
        };
        Ok(output)
    }
}

fn stats(engine: &CliEngine) -> Value {
    let state = engine.state();
    let now = engine.clock().now();
    let memberships: usize = state.daos.daos().map(|dao| dao.members.len()).sum();
    let private_daos = state.daos.daos().filter(|dao| dao.is_private).count();
    let mut by_state: BTreeMap<String, u64> = BTreeMap::new();
    let mut voters = 0;
    for proposal in state.proposals.iter() {
        *by_state.entry(proposal.state(now).to_string()).or_default() += 1;
        voters += state.votes.votes(proposal.id).map_or(0, |votes| votes.voter_count());
    }
    json!({
        "users": engine.total_users(),
        "daos": engine.total_daos(),
        "private_daos": private_daos,
        "memberships": memberships,
        "proposals": engine.total_proposals(),
        "proposals_by_state": by_state,
        "voters": voters,
        "tokens_deployed": engine.ledger().factory().total_deployed(),
    })
}

fn show_proposal(engine: &CliEngine, id: ProposalId) -> anyhow::Result<Value> {
    let now = engine.clock().now();
    let proposal = engine.proposal(id)?;
    let state = proposal.state(now);
    let timing = if now < proposal.begin {
        format!("opens in {}", format_duration(proposal.begin.remaining_from(now)))
    } else if now < proposal.end {
        format!("closes in {}", format_duration(proposal.end.remaining_from(now)))
    } else {
        format!("closed {} ago", format_duration(proposal.end.elapsed_since(now)))
    };
    Ok(json!({
        "proposal": proposal,
        "state": state.to_string(),
        "timing": timing,
        "tally": engine.tally(id)?,
        "yes_voters": engine.yes_voters(id)?,
        "no_voters": engine.no_voters(id)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{CliClock, Workspace};
    use civitas_governance::GovernanceParams;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(subcommand)]
        command: Command,
    }

    fn engine(now: u64) -> CliEngine {
        let params = GovernanceParams {
            qv_unit: TokenAmount::new(1),
            ..Default::default()
        };
        Workspace::default()
            .into_engine(params, CliClock::Fixed(Timestamp::new(now)))
            .unwrap()
    }

    fn run(engine: &mut CliEngine, args: &[&str]) -> anyhow::Result<Value> {
        let harness = Harness::try_parse_from(std::iter::once("civitas").chain(args.iter().copied()))?;
        harness.command.run(engine)
    }

    const A: &str = "0x1111111111111111111111111111111111111111";
    const B: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn threshold_flow_end_to_end() {
        let mut engine = engine(100);
        run(&mut engine, &["create-user", "--wallet", A, "--name", "ada"]).unwrap();
        run(&mut engine, &["create-user", "--wallet", B]).unwrap();
        let dao = run(
            &mut engine,
            &["create-dao", "--creator", A, "--name", "Guild", "--token", "GOV", "--joining-threshold", "5"],
        )
        .unwrap();
        assert_eq!(dao["dao"], 1);

        for wallet in [A, B] {
            run(&mut engine, &["mint", "--token", "GOV", "--to", wallet, "--amount", "100"]).unwrap();
            run(&mut engine, &["approve", "--token", "GOV", "--owner", wallet, "--amount", "100"]).unwrap();
        }
        run(&mut engine, &["join-dao", "--dao", "1", "--wallet", B]).unwrap();
        let members = run(&mut engine, &["members", "--dao", "1"]).unwrap();
        assert_eq!(members["members"], json!([1, 2]));

        let proposal = run(
            &mut engine,
            &[
                "create-proposal", "--type", "1", "--title", "Paint the hall", "--dao", "1",
                "--token", "GOV", "--proposer", A, "--voting-threshold", "10", "--end", "200",
                "--vote-once",
            ],
        )
        .unwrap();
        assert_eq!(proposal["proposal"], 1);

        run(&mut engine, &["vote", "--proposal", "1", "--choice", "1", "--voter", A]).unwrap();
        run(&mut engine, &["vote", "--proposal", "1", "--choice", "2", "--voter", B]).unwrap();
        let balance = run(&mut engine, &["balance", "--token", "GOV", "--wallet", B]).unwrap();
        assert_eq!(balance["balance"], "90");

        let shown = run(&mut engine, &["show-proposal", "--id", "1"]).unwrap();
        assert_eq!(shown["state"], "active");
        assert_eq!(shown["timing"], "closes in 1m 40s");
        assert_eq!(shown["tally"], json!({ "yes": 1, "no": 1 }));

        assert!(run(&mut engine, &["finalize", "--proposal", "1"]).is_err());
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let mut engine = engine(0);
        run(&mut engine, &["create-dao", "--creator", A, "--name", "G", "--token", "GOV"]).unwrap();
        let err = run(
            &mut engine,
            &["create-proposal", "--type", "3", "--title", "x", "--dao", "1", "--token", "GOV", "--proposer", A],
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown proposal type code 3"));
        assert!(run(&mut engine, &["vote", "--proposal", "1", "--choice", "0", "--voter", A]).is_err());
    }

    #[test]
    fn negative_threshold_reaches_the_engine() {
        let mut engine = engine(0);
        let err = run(
            &mut engine,
            &["create-dao", "--creator", A, "--name", "G", "--token", "GOV", "--joining-threshold", "-3"],
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be non-negative"));
    }

    #[test]
    fn deploy_token_funds_the_creator() {
        let mut engine = engine(0);
        run(&mut engine, &["create-user", "--wallet", A, "--name", "ada"]).unwrap();
        let deployed = run(
            &mut engine,
            &["deploy-token", "--name", "Test DAO Token", "--symbol", "TDT", "--supply", "500t", "--creator", "1"],
        )
        .unwrap();
        assert_eq!(deployed["token"], "TDT");
        assert_eq!(deployed["deployed_by_creator"], 1);

        let balance = run(&mut engine, &["balance", "--token", "TDT", "--wallet", A]).unwrap();
        assert_eq!(balance["balance"], TokenAmount::from_whole_tokens(500).unwrap().raw().to_string());

        let listed = run(&mut engine, &["deployed-tokens", "--user", "1"]).unwrap();
        assert_eq!(listed["tokens"][0]["name"], "Test DAO Token");
        assert_eq!(run(&mut engine, &["deployed-tokens", "--user", "2"]).unwrap()["tokens"], json!([]));

        assert!(run(
            &mut engine,
            &["deploy-token", "--name", "Ghost", "--symbol", "GHO", "--creator", "9"],
        )
        .is_err());
    }

    #[test]
    fn stats_and_users_summarize_state() {
        let mut engine = engine(100);
        run(&mut engine, &["create-user", "--wallet", A, "--name", "ada"]).unwrap();
        run(&mut engine, &["create-user", "--wallet", B, "--name", "bob"]).unwrap();
        run(&mut engine, &["create-dao", "--creator", A, "--name", "G", "--token", "GOV"]).unwrap();
        run(&mut engine, &["create-dao", "--creator", B, "--name", "H", "--token", "GOV", "--private"]).unwrap();
        run(&mut engine, &["join-dao", "--dao", "1", "--wallet", B]).unwrap();
        run(
            &mut engine,
            &["create-proposal", "--type", "1", "--title", "x", "--dao", "1", "--token", "GOV", "--proposer", A, "--end", "200"],
        )
        .unwrap();
        run(&mut engine, &["vote", "--proposal", "1", "--choice", "1", "--voter", A]).unwrap();

        let users = run(&mut engine, &["users"]).unwrap();
        assert_eq!(users["users"][1]["name"], "bob");

        let stats = run(&mut engine, &["stats"]).unwrap();
        assert_eq!(stats["users"], 2);
        assert_eq!(stats["private_daos"], 1);
        assert_eq!(stats["memberships"], 3);
        assert_eq!(stats["proposals_by_state"], json!({ "active": 1 }));
        assert_eq!(stats["voters"], 1);
        assert_eq!(stats["tokens_deployed"], 0);
    }

    #[test]
    fn only_writes_mutate() {
        let parse = |args: &[&str]| {
            Harness::try_parse_from(std::iter::once("civitas").chain(args.iter().copied()))
                .unwrap()
                .command
        };
        assert!(parse(&["finalize", "--proposal", "1"]).mutates());
        assert!(parse(&["deploy-token", "--name", "T", "--symbol", "T", "--creator", "1"]).mutates());
        assert!(!parse(&["deployed-tokens", "--user", "1"]).mutates());
        assert!(!parse(&["show-dao", "--id", "1"]).mutates());
        assert!(!parse(&["stats"]).mutates());
    }
}
