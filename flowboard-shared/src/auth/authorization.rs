//! Authorization decisions for boards, tasks, and comments
//!
//! Every mutation and read in Flowboard is gated by one pure function:
//! [`evaluate`] takes the acting user, an [`Action`] describing the intended
//! operation together with a relational snapshot of its target, and returns a
//! [`Decision`]. There is no ambient "current user", no database access, and
//! no caching: callers resolve the relationships (board owner, member list,
//! comment author) up front and the evaluator only performs equality and
//! set-membership tests on that snapshot.
//!
//! # Permission Model
//!
//! - **Owner**: the user who created a board. Exclusive right to rename or
//!   delete the board and to change its member list. Always treated as a
//!   member.
//! - **Member**: may read the board and everything on it, create and update
//!   tasks, designate assignees/reviewers (who must themselves be members),
//!   and comment.
//! - **Author**: a comment is deletable only by the user who wrote it, board
//!   ownership notwithstanding.
//!
//! Decisions fail closed: if the caller did not resolve a board's member
//! list, every member-gated check denies with
//! [`DenyReason::MembersUnresolved`] rather than assuming permissiveness.
//! Ownership is the one exception, since owner equality needs no member list.
//!
//! # Example
//!
//! ```
//! use flowboard_shared::auth::authorization::{evaluate, Action, BoardScope};
//! use uuid::Uuid;
//!
//! let owner = Uuid::new_v4();
//! let member = Uuid::new_v4();
//! let board = BoardScope::resolved(owner, [member]);
//!
//! assert!(evaluate(member, Action::CreateTask(&board)).is_allowed());
//! assert!(!evaluate(member, Action::DeleteBoard(&board)).is_allowed());
//! ```

use std::collections::HashSet;

use uuid::Uuid;

/// Reason an action was denied.
///
/// Each variant carries a stable machine-readable code (see
/// [`DenyReason::code`]) that the API layer includes in 403 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    /// Action is reserved for the board owner
    #[error("only the board owner may perform this action")]
    NotBoardOwner,

    /// Actor is not a member of the board
    #[error("not a member of this board")]
    NotBoardMember,

    /// The user being designated as assignee/reviewer is not a board member
    #[error("the designated user is not a member of this board")]
    AssigneeNotMember,

    /// Comments are deletable only by their author
    #[error("only the comment author may delete a comment")]
    NotCommentAuthor,

    /// Tasks are deletable only by their creator or the board owner
    #[error("only the task creator or the board owner may delete a task")]
    NotTaskCreatorOrBoardOwner,

    /// Board reassignment of an existing task is categorically disallowed
    #[error("a task cannot be moved to another board")]
    TaskBoardImmutable,

    /// The caller did not resolve the board's member list; fail closed
    #[error("board member list was not resolved")]
    MembersUnresolved,
}

impl DenyReason {
    /// Stable snake_case code for API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::NotBoardOwner => "not_board_owner",
            DenyReason::NotBoardMember => "not_board_member",
            DenyReason::AssigneeNotMember => "assignee_not_member",
            DenyReason::NotCommentAuthor => "not_comment_author",
            DenyReason::NotTaskCreatorOrBoardOwner => "not_task_creator_or_board_owner",
            DenyReason::TaskBoardImmutable => "task_board_immutable",
            DenyReason::MembersUnresolved => "members_unresolved",
        }
    }
}

/// Relational snapshot of a board, as needed for access decisions.
///
/// `members` is `None` when the caller did not load the member list. Member
/// checks against an unresolved list deny (fail closed); ownership checks
/// still work, since they only compare user ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardScope {
    /// The board owner's user id
    pub owner_id: Uuid,

    /// Resolved member set, or `None` if the caller did not load it
    pub members: Option<HashSet<Uuid>>,
}

impl BoardScope {
    /// Scope with a fully resolved member list.
    ///
    /// The owner does not need to appear in `members`; ownership implies
    /// membership for every check.
    pub fn resolved(owner_id: Uuid, members: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            owner_id,
            members: Some(members.into_iter().collect()),
        }
    }

    /// Scope whose member list was not loaded.
    ///
    /// Member-gated checks against this scope deny for everyone but the
    /// owner.
    pub fn unresolved(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            members: None,
        }
    }

    /// Whether `user_id` owns the board.
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    fn ownership(&self, user_id: Uuid) -> Result<(), DenyReason> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DenyReason::NotBoardOwner)
        }
    }

    fn membership(&self, user_id: Uuid) -> Result<(), DenyReason> {
        // Ownership implies membership, resolvable without the member list.
        if self.is_owner(user_id) {
            return Ok(());
        }
        match &self.members {
            None => Err(DenyReason::MembersUnresolved),
            Some(members) if members.contains(&user_id) => Ok(()),
            Some(_) => Err(DenyReason::NotBoardMember),
        }
    }
}

/// Relational snapshot of a task: its board plus its creator.
///
/// The assignee and reviewer are deliberately absent. No rule consults the
/// *current* assignee; assignment checks validate the *designated* user,
/// which arrives in [`Action::AssignTask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskScope {
    /// The board the task lives on
    pub board: BoardScope,

    /// Who created the task (`None` once the creator's account is deleted)
    pub created_by: Option<Uuid>,
}

/// Relational snapshot of a comment: its author plus the board it sits on
/// (via its task).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentScope {
    /// Who wrote the comment
    pub author_id: Uuid,

    /// The board of the comment's task
    pub board: BoardScope,
}

/// An intended operation together with the snapshot of its target.
#[derive(Debug, Clone)]
pub enum Action<'a> {
    /// View a board, its members, and its tasks
    ReadBoard(&'a BoardScope),

    /// Rename a board or change its member list
    ModifyBoard(&'a BoardScope),

    /// Delete a board and everything on it
    DeleteBoard(&'a BoardScope),

    /// Create a task on a board
    CreateTask(&'a BoardScope),

    /// View a task
    ReadTask(&'a TaskScope),

    /// Change a task's title, description, status, priority, or due date
    UpdateTask(&'a TaskScope),

    /// Delete a task
    DeleteTask(&'a TaskScope),

    /// Move a task to a different board
    MoveTask {
        /// The task being moved
        task: &'a TaskScope,
        /// The board it would move to
        destination: &'a BoardScope,
    },

    /// Designate `user_id` as the task's assignee or reviewer
    AssignTask {
        /// The task being assigned
        task: &'a TaskScope,
        /// The user being designated
        user_id: Uuid,
    },

    /// Comment on a task
    CreateComment(&'a TaskScope),

    /// View a comment
    ReadComment(&'a CommentScope),

    /// Delete a comment
    DeleteComment(&'a CommentScope),
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The action is permitted
    Allow,

    /// The action is denied, with the reason
    Deny(DenyReason),
}

impl Decision {
    /// Whether the action was allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// The deny reason, if denied.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

/// Decides whether `actor` may perform `action`.
///
/// Pure and synchronous: the entire evaluation is equality and
/// set-membership tests against the snapshot inside `action`. Safe to call
/// concurrently from any number of request tasks. Never panics; incomplete
/// snapshots produce a deny, not an error.
///
/// # Decision table
///
/// | Action                   | Rule                                       |
/// |--------------------------|--------------------------------------------|
/// | DeleteBoard, ModifyBoard | actor is board owner                       |
/// | ReadBoard, CreateTask    | actor is member (owner implied)            |
/// | ReadTask, UpdateTask,    | actor is member of the task's board        |
/// | CreateComment            |                                            |
/// | DeleteTask               | actor is task creator or board owner       |
/// | MoveTask                 | never                                      |
/// | AssignTask               | actor and designated user are both members |
/// | ReadComment              | actor is member of the comment's board     |
/// | DeleteComment            | actor is the comment author                |
pub fn evaluate(actor: Uuid, action: Action<'_>) -> Decision {
    let verdict = match action {
        Action::DeleteBoard(board) | Action::ModifyBoard(board) => board.ownership(actor),

        Action::ReadBoard(board) | Action::CreateTask(board) => board.membership(actor),

        Action::ReadTask(task) | Action::UpdateTask(task) | Action::CreateComment(task) => {
            task.board.membership(actor)
        }

        Action::DeleteTask(task) => {
            if task.created_by == Some(actor) || task.board.is_owner(actor) {
                Ok(())
            } else {
                Err(DenyReason::NotTaskCreatorOrBoardOwner)
            }
        }

        // Board reassignment is a permanent policy violation, not a role
        // question: denied for everyone, owner included.
        Action::MoveTask { .. } => Err(DenyReason::TaskBoardImmutable),

        Action::AssignTask { task, user_id } => {
            task.board.membership(actor).and_then(|()| {
                task.board.membership(user_id).map_err(|reason| match reason {
                    DenyReason::NotBoardMember => DenyReason::AssigneeNotMember,
                    other => other,
                })
            })
        }

        Action::ReadComment(comment) => comment.board.membership(actor),

        Action::DeleteComment(comment) => {
            if comment.author_id == actor {
                Ok(())
            } else {
                Err(DenyReason::NotCommentAuthor)
            }
        }
    };

    match verdict {
        Ok(()) => Decision::Allow,
        Err(reason) => Decision::Deny(reason),
    }
}

/// [`evaluate`], as a `Result` for `?`-style use in handlers.
///
/// # Example
///
/// ```
/// use flowboard_shared::auth::authorization::{require, Action, BoardScope};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), flowboard_shared::auth::authorization::DenyReason> {
/// let owner = Uuid::new_v4();
/// let board = BoardScope::resolved(owner, []);
/// require(owner, Action::DeleteBoard(&board))?;
/// # Ok(())
/// # }
/// ```
pub fn require(actor: Uuid, action: Action<'_>) -> Result<(), DenyReason> {
    match evaluate(actor, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<const N: usize>() -> [Uuid; N] {
        std::array::from_fn(|_| Uuid::new_v4())
    }

    #[test]
    fn delete_board_is_owner_only() {
        let [owner, member, outsider] = ids();
        let board = BoardScope::resolved(owner, [member]);

        assert!(evaluate(owner, Action::DeleteBoard(&board)).is_allowed());
        assert_eq!(
            evaluate(member, Action::DeleteBoard(&board)),
            Decision::Deny(DenyReason::NotBoardOwner)
        );
        assert_eq!(
            evaluate(outsider, Action::DeleteBoard(&board)),
            Decision::Deny(DenyReason::NotBoardOwner)
        );
    }

    #[test]
    fn modify_board_is_owner_only() {
        let [owner, member] = ids();
        let board = BoardScope::resolved(owner, [member]);

        assert!(evaluate(owner, Action::ModifyBoard(&board)).is_allowed());
        assert_eq!(
            evaluate(member, Action::ModifyBoard(&board)),
            Decision::Deny(DenyReason::NotBoardOwner)
        );
    }

    #[test]
    fn owner_is_always_a_member() {
        // A board with no explicit members at all: the owner still passes
        // every member-gated check.
        let [owner] = ids();
        let board = BoardScope::resolved(owner, []);

        assert!(evaluate(owner, Action::CreateTask(&board)).is_allowed());
        assert!(evaluate(owner, Action::ReadBoard(&board)).is_allowed());
    }

    #[test]
    fn members_may_create_and_update_tasks() {
        let [owner, member, outsider] = ids();
        let board = BoardScope::resolved(owner, [member]);
        let task = TaskScope {
            board: board.clone(),
            created_by: Some(member),
        };

        assert!(evaluate(member, Action::CreateTask(&board)).is_allowed());
        assert!(evaluate(member, Action::UpdateTask(&task)).is_allowed());
        assert_eq!(
            evaluate(outsider, Action::UpdateTask(&task)),
            Decision::Deny(DenyReason::NotBoardMember)
        );
    }

    #[test]
    fn move_task_is_always_denied() {
        let [owner, member] = ids();
        let board = BoardScope::resolved(owner, [member]);
        let task = TaskScope {
            board: board.clone(),
            created_by: Some(owner),
        };
        let destination = BoardScope::resolved(owner, [member]);

        // Not even the owner of both boards may do this.
        for actor in [owner, member] {
            assert_eq!(
                evaluate(
                    actor,
                    Action::MoveTask {
                        task: &task,
                        destination: &destination,
                    }
                ),
                Decision::Deny(DenyReason::TaskBoardImmutable)
            );
        }
    }

    #[test]
    fn assigning_requires_both_sides_to_be_members() {
        let [owner, alice, stranger] = ids();
        let board = BoardScope::resolved(owner, [alice]);
        let task = TaskScope {
            board,
            created_by: Some(alice),
        };

        assert!(evaluate(
            alice,
            Action::AssignTask {
                task: &task,
                user_id: alice,
            }
        )
        .is_allowed());

        // Non-member designee
        assert_eq!(
            evaluate(
                alice,
                Action::AssignTask {
                    task: &task,
                    user_id: stranger,
                }
            ),
            Decision::Deny(DenyReason::AssigneeNotMember)
        );

        // Non-member actor is rejected before the designee is looked at
        assert_eq!(
            evaluate(
                stranger,
                Action::AssignTask {
                    task: &task,
                    user_id: alice,
                }
            ),
            Decision::Deny(DenyReason::NotBoardMember)
        );
    }

    #[test]
    fn assigning_the_owner_is_allowed() {
        let [owner, member] = ids();
        let board = BoardScope::resolved(owner, [member]);
        let task = TaskScope {
            board,
            created_by: Some(member),
        };

        // The owner never appears in the member set here, yet counts as one.
        assert!(evaluate(
            member,
            Action::AssignTask {
                task: &task,
                user_id: owner,
            }
        )
        .is_allowed());
    }

    #[test]
    fn comment_deletion_is_author_only() {
        let [alice, bob] = ids();
        // alice owns the board, bob wrote the comment
        let board = BoardScope::resolved(alice, [bob]);
        let comment = CommentScope {
            author_id: bob,
            board,
        };

        assert!(evaluate(bob, Action::DeleteComment(&comment)).is_allowed());
        // Board ownership does not override authorship.
        assert_eq!(
            evaluate(alice, Action::DeleteComment(&comment)),
            Decision::Deny(DenyReason::NotCommentAuthor)
        );
    }

    #[test]
    fn task_deletion_is_creator_or_board_owner() {
        let [owner, creator, member] = ids();
        let board = BoardScope::resolved(owner, [creator, member]);
        let task = TaskScope {
            board,
            created_by: Some(creator),
        };

        assert!(evaluate(creator, Action::DeleteTask(&task)).is_allowed());
        assert!(evaluate(owner, Action::DeleteTask(&task)).is_allowed());
        assert_eq!(
            evaluate(member, Action::DeleteTask(&task)),
            Decision::Deny(DenyReason::NotTaskCreatorOrBoardOwner)
        );
    }

    #[test]
    fn orphaned_task_is_deletable_by_owner_only() {
        let [owner, member] = ids();
        let board = BoardScope::resolved(owner, [member]);
        let task = TaskScope {
            board,
            created_by: None,
        };

        assert!(evaluate(owner, Action::DeleteTask(&task)).is_allowed());
        assert_eq!(
            evaluate(member, Action::DeleteTask(&task)),
            Decision::Deny(DenyReason::NotTaskCreatorOrBoardOwner)
        );
    }

    #[test]
    fn board_scenario_alice_and_bob() {
        // Board owned by alice, members {alice, bob}; task on the board;
        // comment on the task authored by bob.
        let [alice, bob] = ids();
        let board = BoardScope::resolved(alice, [alice, bob]);
        let task = TaskScope {
            board: board.clone(),
            created_by: Some(alice),
        };
        let comment = CommentScope {
            author_id: bob,
            board: board.clone(),
        };

        assert!(evaluate(bob, Action::UpdateTask(&task)).is_allowed());
        assert!(!evaluate(bob, Action::DeleteBoard(&board)).is_allowed());
        assert!(!evaluate(alice, Action::DeleteComment(&comment)).is_allowed());
        assert!(evaluate(bob, Action::DeleteComment(&comment)).is_allowed());
    }

    #[test]
    fn membership_is_reevaluated_live() {
        let [owner, bob] = ids();
        let before = BoardScope::resolved(owner, [bob]);
        let task = TaskScope {
            board: before,
            created_by: Some(owner),
        };

        assert!(evaluate(
            owner,
            Action::AssignTask {
                task: &task,
                user_id: bob,
            }
        )
        .is_allowed());

        // bob is removed from the board. The stored assignee is untouched
        // (nothing here mutates a task), but a fresh check now denies.
        let after = TaskScope {
            board: BoardScope::resolved(owner, []),
            created_by: Some(owner),
        };
        assert_eq!(
            evaluate(
                owner,
                Action::AssignTask {
                    task: &after,
                    user_id: bob,
                }
            ),
            Decision::Deny(DenyReason::AssigneeNotMember)
        );
    }

    #[test]
    fn unresolved_members_fail_closed() {
        let [owner, somebody] = ids();
        let board = BoardScope::unresolved(owner);

        // Member-gated checks deny anyone but the owner.
        assert_eq!(
            evaluate(somebody, Action::ReadBoard(&board)),
            Decision::Deny(DenyReason::MembersUnresolved)
        );
        assert_eq!(
            evaluate(somebody, Action::CreateTask(&board)),
            Decision::Deny(DenyReason::MembersUnresolved)
        );

        // Owner-equality checks still resolve.
        assert!(evaluate(owner, Action::CreateTask(&board)).is_allowed());
        assert!(evaluate(owner, Action::DeleteBoard(&board)).is_allowed());
    }

    #[test]
    fn require_maps_decisions_to_results() {
        let [owner, outsider] = ids();
        let board = BoardScope::resolved(owner, []);

        assert!(require(owner, Action::DeleteBoard(&board)).is_ok());
        assert_eq!(
            require(outsider, Action::DeleteBoard(&board)),
            Err(DenyReason::NotBoardOwner)
        );
    }

    #[test]
    fn deny_reason_codes_are_stable() {
        assert_eq!(DenyReason::NotBoardOwner.code(), "not_board_owner");
        assert_eq!(DenyReason::NotBoardMember.code(), "not_board_member");
        assert_eq!(DenyReason::AssigneeNotMember.code(), "assignee_not_member");
        assert_eq!(DenyReason::NotCommentAuthor.code(), "not_comment_author");
        assert_eq!(
            DenyReason::TaskBoardImmutable.code(),
            "task_board_immutable"
        );
        assert_eq!(DenyReason::MembersUnresolved.code(), "members_unresolved");
    }

    #[test]
    fn deny_reason_display() {
        assert!(DenyReason::NotBoardMember.to_string().contains("member"));
        assert!(DenyReason::TaskBoardImmutable.to_string().contains("moved"));
    }
}
