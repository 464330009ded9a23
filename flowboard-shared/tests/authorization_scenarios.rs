//! Scenario tests for the permission evaluator
//!
//! These exercise the evaluator the way the API layer does: build the
//! relational snapshot of a small team working on a board, then walk through
//! a realistic sequence of operations. Everything here is pure and needs no
//! database.

use std::collections::HashSet;

use flowboard_shared::auth::authorization::{
    evaluate, require, Action, BoardScope, CommentScope, Decision, DenyReason, TaskScope,
};
use uuid::Uuid;

struct Team {
    alice: Uuid,
    bob: Uuid,
    carol: Uuid,
    outsider: Uuid,
}

impl Team {
    fn new() -> Self {
        Self {
            alice: Uuid::new_v4(),
            bob: Uuid::new_v4(),
            carol: Uuid::new_v4(),
            outsider: Uuid::new_v4(),
        }
    }

    /// Board owned by alice with bob and carol as members.
    fn board(&self) -> BoardScope {
        BoardScope::resolved(self.alice, [self.alice, self.bob, self.carol])
    }
}

#[test]
fn full_board_lifecycle() {
    let team = Team::new();
    let board = team.board();

    // Everyone on the board reads it; the outsider does not.
    for user in [team.alice, team.bob, team.carol] {
        assert!(evaluate(user, Action::ReadBoard(&board)).is_allowed());
    }
    assert_eq!(
        evaluate(team.outsider, Action::ReadBoard(&board)),
        Decision::Deny(DenyReason::NotBoardMember)
    );

    // Only alice may rename the board or change its member list.
    assert!(evaluate(team.alice, Action::ModifyBoard(&board)).is_allowed());
    for user in [team.bob, team.carol, team.outsider] {
        assert_eq!(
            evaluate(user, Action::ModifyBoard(&board)),
            Decision::Deny(DenyReason::NotBoardOwner)
        );
    }

    // Only alice may delete it.
    assert!(evaluate(team.alice, Action::DeleteBoard(&board)).is_allowed());
    assert_eq!(
        evaluate(team.bob, Action::DeleteBoard(&board)),
        Decision::Deny(DenyReason::NotBoardOwner)
    );
}

#[test]
fn task_workflow_with_assignment_and_review() {
    let team = Team::new();
    let board = team.board();

    // bob creates a task and assigns carol, with alice reviewing.
    assert!(evaluate(team.bob, Action::CreateTask(&board)).is_allowed());

    let task = TaskScope {
        board: board.clone(),
        created_by: Some(team.bob),
    };

    for designated in [team.carol, team.alice] {
        assert!(evaluate(
            team.bob,
            Action::AssignTask {
                task: &task,
                user_id: designated,
            }
        )
        .is_allowed());
    }

    // Assigning the outsider fails even though bob is a member.
    assert_eq!(
        evaluate(
            team.bob,
            Action::AssignTask {
                task: &task,
                user_id: team.outsider,
            }
        ),
        Decision::Deny(DenyReason::AssigneeNotMember)
    );

    // carol moves the task along; the outsider cannot touch it.
    assert!(evaluate(team.carol, Action::UpdateTask(&task)).is_allowed());
    assert_eq!(
        evaluate(team.outsider, Action::UpdateTask(&task)),
        Decision::Deny(DenyReason::NotBoardMember)
    );

    // Deletion: bob created it, alice owns the board, carol is neither.
    assert!(evaluate(team.bob, Action::DeleteTask(&task)).is_allowed());
    assert!(evaluate(team.alice, Action::DeleteTask(&task)).is_allowed());
    assert_eq!(
        evaluate(team.carol, Action::DeleteTask(&task)),
        Decision::Deny(DenyReason::NotTaskCreatorOrBoardOwner)
    );
}

#[test]
fn board_reassignment_is_denied_for_every_role() {
    let team = Team::new();
    let board = team.board();
    let other_board = BoardScope::resolved(team.alice, [team.bob]);
    let task = TaskScope {
        board,
        created_by: Some(team.alice),
    };

    for actor in [team.alice, team.bob, team.carol, team.outsider] {
        assert_eq!(
            require(
                actor,
                Action::MoveTask {
                    task: &task,
                    destination: &other_board,
                }
            ),
            Err(DenyReason::TaskBoardImmutable)
        );
    }
}

#[test]
fn comment_thread_permissions() {
    let team = Team::new();
    let board = team.board();
    let task = TaskScope {
        board: board.clone(),
        created_by: Some(team.alice),
    };

    // Members comment; outsiders do not.
    assert!(evaluate(team.bob, Action::CreateComment(&task)).is_allowed());
    assert_eq!(
        evaluate(team.outsider, Action::CreateComment(&task)),
        Decision::Deny(DenyReason::NotBoardMember)
    );

    let bobs_comment = CommentScope {
        author_id: team.bob,
        board: board.clone(),
    };

    // All members read the thread.
    assert!(evaluate(team.carol, Action::ReadComment(&bobs_comment)).is_allowed());

    // Only bob deletes his comment. Not carol, and not alice despite owning
    // the board.
    assert!(evaluate(team.bob, Action::DeleteComment(&bobs_comment)).is_allowed());
    for user in [team.alice, team.carol, team.outsider] {
        assert_eq!(
            evaluate(user, Action::DeleteComment(&bobs_comment)),
            Decision::Deny(DenyReason::NotCommentAuthor)
        );
    }
}

#[test]
fn membership_removal_takes_effect_on_the_next_decision() {
    let team = Team::new();

    let task_before = TaskScope {
        board: team.board(),
        created_by: Some(team.alice),
    };
    assert!(evaluate(
        team.alice,
        Action::AssignTask {
            task: &task_before,
            user_id: team.bob,
        }
    )
    .is_allowed());

    // alice removes bob. The snapshot for the next request no longer lists
    // him, and the same check now denies; the task row itself is untouched.
    let task_after = TaskScope {
        board: BoardScope::resolved(team.alice, [team.alice, team.carol]),
        created_by: Some(team.alice),
    };
    assert_eq!(
        evaluate(
            team.alice,
            Action::AssignTask {
                task: &task_after,
                user_id: team.bob,
            }
        ),
        Decision::Deny(DenyReason::AssigneeNotMember)
    );

    // bob can no longer read the board either.
    assert_eq!(
        evaluate(team.bob, Action::ReadBoard(&task_after.board)),
        Decision::Deny(DenyReason::NotBoardMember)
    );
}

#[test]
fn incomplete_snapshots_never_grant_access() {
    let team = Team::new();
    let board = BoardScope::unresolved(team.alice);
    let task = TaskScope {
        board: board.clone(),
        created_by: Some(team.bob),
    };
    let comment = CommentScope {
        author_id: team.bob,
        board: board.clone(),
    };

    // Every member-gated action fails closed for non-owners.
    assert_eq!(
        evaluate(team.bob, Action::ReadBoard(&board)),
        Decision::Deny(DenyReason::MembersUnresolved)
    );
    assert_eq!(
        evaluate(team.bob, Action::UpdateTask(&task)),
        Decision::Deny(DenyReason::MembersUnresolved)
    );
    assert_eq!(
        evaluate(team.bob, Action::ReadComment(&comment)),
        Decision::Deny(DenyReason::MembersUnresolved)
    );

    // Checks that rest on plain equality still work: ownership and comment
    // authorship need no member list.
    assert!(evaluate(team.alice, Action::DeleteBoard(&board)).is_allowed());
    assert!(evaluate(team.bob, Action::DeleteComment(&comment)).is_allowed());
}

#[test]
fn member_sets_deduplicate() {
    let team = Team::new();

    // The owner appearing in the member list twice over changes nothing.
    let board = BoardScope {
        owner_id: team.alice,
        members: Some(HashSet::from([team.alice, team.alice, team.bob])),
    };

    assert_eq!(board.members.as_ref().unwrap().len(), 2);
    assert!(evaluate(team.alice, Action::CreateTask(&board)).is_allowed());
    assert!(evaluate(team.bob, Action::CreateTask(&board)).is_allowed());
}
