/// Membership operations
///
/// All three mutations are ADMIN-gated and run their guard check against
/// state read in the same unit of work, including the board's current
/// administrator count, so the admin-set invariant holds under concurrency:
/// two racing removals of different admins each see the count their commit
/// order implies.
///
/// Members are addressed by email at this layer because that is how
/// collaborators know each other; the user lookup happens inside the unit of
/// work.

use crate::auth::authorization::{require_board_role, ADMIN_ONLY, ANY_ROLE};
use crate::error::{DomainError, DomainResult};
use crate::guard;
use crate::models::{BoardRole, Membership, User};
use crate::ops::BoardOps;
use futures::FutureExt;
use tracing::info;
use uuid::Uuid;

impl BoardOps {
    /// Lists a board's members
    pub async fn list_members(
        &self,
        acting_user: Uuid,
        board_id: i64,
    ) -> DomainResult<Vec<Membership>> {
        self.coordinator
            .run_read_only(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ANY_ROLE).await?;
                    let members = Membership::list_for_board(&mut *conn, board_id).await?;
                    Ok(members)
                }
                .boxed()
            })
            .await
    }

    /// Adds a user to a board by email
    pub async fn add_member(
        &self,
        acting_user: Uuid,
        board_id: i64,
        email: String,
        role: BoardRole,
    ) -> DomainResult<Membership> {
        let member = self
            .coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ADMIN_ONLY).await?;

                    let user = User::find_by_email(&mut *conn, &email)
                        .await?
                        .ok_or_else(|| DomainError::UserNotFound(email.clone()))?;
                    let existing = Membership::find(&mut *conn, board_id, user.id).await?;

                    guard::check_add_member(existing.as_ref(), role)?;

                    let member = Membership::create(&mut *conn, board_id, user.id, role).await?;
                    Ok(member)
                }
                .boxed()
            })
            .await?;

        info!(board_id, user_id = %member.user_id, role = role.as_str(), "Member added");
        Ok(member)
    }

    /// Changes a member's role, addressed by email
    pub async fn update_member(
        &self,
        acting_user: Uuid,
        board_id: i64,
        email: String,
        role: BoardRole,
    ) -> DomainResult<Membership> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ADMIN_ONLY).await?;

                    let user = User::find_by_email(&mut *conn, &email)
                        .await?
                        .ok_or_else(|| DomainError::UserNotFound(email.clone()))?;
                    let existing = Membership::find(&mut *conn, board_id, user.id).await?;
                    let admin_count = Membership::admin_count(&mut *conn, board_id).await?;

                    guard::check_update_member(
                        board_id,
                        acting_user,
                        user.id,
                        existing.as_ref(),
                        role,
                        admin_count,
                    )?;

                    Membership::update_role(&mut *conn, board_id, user.id, role)
                        .await?
                        .ok_or(DomainError::MemberNotFound {
                            board_id,
                            user_id: user.id,
                        })
                }
                .boxed()
            })
            .await
    }

    /// Removes a member from a board, addressed by email
    pub async fn remove_member(
        &self,
        acting_user: Uuid,
        board_id: i64,
        email: String,
    ) -> DomainResult<()> {
        self.coordinator
            .run(move |conn| {
                async move {
                    require_board_role(conn, board_id, acting_user, ADMIN_ONLY).await?;

                    let user = User::find_by_email(&mut *conn, &email)
                        .await?
                        .ok_or_else(|| DomainError::UserNotFound(email.clone()))?;
                    let existing = Membership::find(&mut *conn, board_id, user.id).await?;
                    let admin_count = Membership::admin_count(&mut *conn, board_id).await?;

                    guard::check_remove_member(
                        board_id,
                        acting_user,
                        user.id,
                        existing.as_ref(),
                        admin_count,
                    )?;

                    Membership::delete(&mut *conn, board_id, user.id).await?;
                    Ok(())
                }
                .boxed()
            })
            .await?;

        info!(board_id, "Member removed");
        Ok(())
    }
}
