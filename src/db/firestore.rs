// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles, skills, reputation)
//! - Swap requests and swaps
//! - Conversations and their nested messages
//! - Sessions, ratings and notifications

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Conversation, Message, Notification, Rating, Session, Swap, SwapRequest, SwapRequestAction,
    SwapRequestStatus, User,
};
use futures_util::{stream, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Drive owned write futures with bounded concurrency; the first error wins.
async fn run_bounded<F>(writes: Vec<F>) -> Result<(), AppError>
where
    F: Future<Output = Result<(), AppError>>,
{
    stream::iter(writes)
        .buffer_unordered(MAX_CONCURRENT_DB_OPS)
        .collect::<Vec<Result<(), AppError>>>()
        .await
        .into_iter()
        .collect()
}

/// Contention on a transactional write means another action won the race.
fn commit_error(err: firestore::errors::FirestoreError) -> AppError {
    match err {
        firestore::errors::FirestoreError::DatabaseError(ref db_err)
            if db_err.public.code == "Aborted" =>
        {
            AppError::Conflict("Swap request was changed concurrently".to_string())
        }
        firestore::errors::FirestoreError::DataConflictError(_) => {
            AppError::Conflict("Swap request was changed concurrently".to_string())
        }
        other => AppError::Database(format!("Transaction commit failed: {}", other)),
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator rejects real credentials, so skip credential discovery.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Generic Document Helpers ────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_doc<T>(&self, collection: &str, id: &str, object: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All documents in `collection` whose `field` equals `value`.
    async fn query_eq<T>(
        &self,
        collection: &str,
        field: &'static str,
        value: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let value = value.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.for_all([q.field(field).eq(value.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All documents in `collection` whose `participant_ids` contains `user_id`.
    async fn query_participant<T>(
        &self,
        collection: &str,
        user_id: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| {
                q.for_all([q.field("participant_ids").array_contains(user_id.clone())])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_doc(collections::USERS, user_id).await
    }

    /// Create or update a user profile.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.set_doc(collections::USERS, &user.id, user).await
    }

    /// Users that are active and not banned (matching candidates).
    pub async fn list_active_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| {
                q.for_all([
                    q.field("is_active").eq(true),
                    q.field("is_banned").eq(false),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every user profile (admin console).
    pub async fn list_all_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write several user profiles concurrently.
    pub async fn upsert_users(&self, users: &[User]) -> Result<(), AppError> {
        let writes: Vec<_> = users
            .iter()
            .cloned()
            .map(|user| {
                let db = self.clone();
                async move { db.upsert_user(&user).await }
            })
            .collect();
        run_bounded(writes).await
    }

    // ─── Swap Request Operations ─────────────────────────────────

    pub async fn get_swap_request(&self, id: &str) -> Result<Option<SwapRequest>, AppError> {
        self.get_doc(collections::SWAP_REQUESTS, id).await
    }

    pub async fn set_swap_request(&self, request: &SwapRequest) -> Result<(), AppError> {
        self.set_doc(collections::SWAP_REQUESTS, &request.id, request)
            .await
    }

    pub async fn list_swap_requests_sent(
        &self,
        user_id: &str,
    ) -> Result<Vec<SwapRequest>, AppError> {
        self.query_eq(collections::SWAP_REQUESTS, "sender_id", user_id)
            .await
    }

    pub async fn list_swap_requests_received(
        &self,
        user_id: &str,
    ) -> Result<Vec<SwapRequest>, AppError> {
        self.query_eq(collections::SWAP_REQUESTS, "recipient_id", user_id)
            .await
    }

    /// Pending requests addressed to a user.
    pub async fn list_pending_swap_requests(
        &self,
        user_id: &str,
    ) -> Result<Vec<SwapRequest>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SWAP_REQUESTS)
            .filter(move |q| {
                q.for_all([
                    q.field("recipient_id").eq(user_id.clone()),
                    q.field("status").eq(SwapRequestStatus::Pending.as_str()),
                ])
            })
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically apply a participant's action to a swap request.
    ///
    /// The request is read through the transaction, so a concurrent writer
    /// makes the commit fail instead of overwriting it. A refused transition
    /// rolls the transaction back.
    pub async fn apply_swap_request_action_atomic(
        &self,
        request_id: &str,
        actor_id: &str,
        action: SwapRequestAction,
        now: &str,
    ) -> Result<SwapRequest, AppError> {
        let client = self.get_client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let tx_client = client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        let current: Option<SwapRequest> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::SWAP_REQUESTS)
            .obj()
            .one(request_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read request in transaction: {}", e))
            })?;

        let Some(mut request) = current else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!(
                "Swap request {} not found",
                request_id
            )));
        };

        if let Err(err) = request.apply(actor_id, action, now) {
            tracing::debug!(
                swap_request_id = request_id,
                actor_id,
                error = %err,
                "Swap request transition refused"
            );
            let _ = transaction.rollback().await;
            return Err(err.into());
        }

        client
            .fluent()
            .update()
            .in_col(collections::SWAP_REQUESTS)
            .document_id(request_id)
            .object(&request)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add request to transaction: {}", e))
            })?;

        transaction.commit().await.map_err(commit_error)?;

        tracing::info!(
            swap_request_id = request_id,
            actor_id,
            status = %request.status,
            "Swap request status updated"
        );

        Ok(request)
    }

    // ─── Swap Operations ─────────────────────────────────────────

    pub async fn get_swap(&self, id: &str) -> Result<Option<Swap>, AppError> {
        self.get_doc(collections::SWAPS, id).await
    }

    pub async fn set_swap(&self, swap: &Swap) -> Result<(), AppError> {
        self.set_doc(collections::SWAPS, &swap.id, swap).await
    }

    /// Swaps where the user is either the teacher or the learner.
    pub async fn list_swaps_for_user(&self, user_id: &str) -> Result<Vec<Swap>, AppError> {
        let (teaching, learning) = tokio::try_join!(
            self.query_eq::<Swap>(collections::SWAPS, "teacher_id", user_id),
            self.query_eq::<Swap>(collections::SWAPS, "learner_id", user_id),
        )?;
        Ok(teaching.into_iter().chain(learning).collect())
    }

    // ─── Conversation Operations ─────────────────────────────────

    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, AppError> {
        self.get_doc(collections::CONVERSATIONS, id).await
    }

    pub async fn set_conversation(&self, conversation: &Conversation) -> Result<(), AppError> {
        self.set_doc(collections::CONVERSATIONS, &conversation.id, conversation)
            .await
    }

    pub async fn list_conversations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Conversation>, AppError> {
        self.query_participant(collections::CONVERSATIONS, user_id)
            .await
    }

    // ─── Message Operations ──────────────────────────────────────

    fn messages_parent(
        &self,
        conversation_id: &str,
    ) -> Result<firestore::ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::CONVERSATIONS, conversation_id)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_message(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<Option<Message>, AppError> {
        let parent = self.messages_parent(conversation_id)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MESSAGES)
            .parent(&parent)
            .obj()
            .one(message_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_message(&self, message: &Message) -> Result<(), AppError> {
        let parent = self.messages_parent(&message.conversation_id)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MESSAGES)
            .document_id(&message.id)
            .parent(&parent)
            .object(message)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Newest `limit` messages of a conversation, returned oldest first.
    pub async fn list_messages(
        &self,
        conversation_id: &str,
        limit: u32,
    ) -> Result<Vec<Message>, AppError> {
        let parent = self.messages_parent(conversation_id)?;
        let mut messages: Vec<Message> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MESSAGES)
            .parent(&parent)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        messages.reverse();
        Ok(messages)
    }

    // ─── Session Operations ──────────────────────────────────────

    pub async fn get_session(&self, id: &str) -> Result<Option<Session>, AppError> {
        self.get_doc(collections::SESSIONS, id).await
    }

    pub async fn set_session(&self, session: &Session) -> Result<(), AppError> {
        self.set_doc(collections::SESSIONS, &session.id, session)
            .await
    }

    pub async fn list_sessions_for_user(&self, user_id: &str) -> Result<Vec<Session>, AppError> {
        self.query_participant(collections::SESSIONS, user_id).await
    }

    // ─── Rating Operations ───────────────────────────────────────

    pub async fn get_rating(&self, id: &str) -> Result<Option<Rating>, AppError> {
        self.get_doc(collections::RATINGS, id).await
    }

    pub async fn set_rating(&self, rating: &Rating) -> Result<(), AppError> {
        self.set_doc(collections::RATINGS, &rating.id, rating).await
    }

    pub async fn list_ratings_received(&self, user_id: &str) -> Result<Vec<Rating>, AppError> {
        self.query_eq(collections::RATINGS, "rated_user_id", user_id)
            .await
    }

    pub async fn list_ratings_given(&self, user_id: &str) -> Result<Vec<Rating>, AppError> {
        self.query_eq(collections::RATINGS, "rated_by_id", user_id)
            .await
    }

    // ─── Notification Operations ─────────────────────────────────

    pub async fn get_notification(&self, id: &str) -> Result<Option<Notification>, AppError> {
        self.get_doc(collections::NOTIFICATIONS, id).await
    }

    pub async fn set_notification(&self, notification: &Notification) -> Result<(), AppError> {
        self.set_doc(collections::NOTIFICATIONS, &notification.id, notification)
            .await
    }

    /// Newest notifications for a user.
    pub async fn list_notifications(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn list_unread_notifications(
        &self,
        user_id: &str,
    ) -> Result<Vec<Notification>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("is_read").eq(false),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store multiple notifications.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn batch_set_notifications(
        &self,
        notifications: &[Notification],
    ) -> Result<(), AppError> {
        let writes: Vec<_> = notifications
            .iter()
            .cloned()
            .map(|notification| {
                let db = self.clone();
                async move { db.set_notification(&notification).await }
            })
            .collect();
        run_bounded(writes).await
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    // ─── User Deletion (admin) ─────────────────────────────────────

    /// Delete a user's profile and notifications.
    ///
    /// Requests, swaps, sessions and ratings are shared with the other
    /// participant and are kept.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let notifications: Vec<Notification> = self
            .query_eq(collections::NOTIFICATIONS, "user_id", user_id)
            .await?;
        let count = notifications.len();
        self.batch_delete(
            &notifications,
            collections::NOTIFICATIONS,
            |notification: &Notification| notification.id.clone(),
        )
        .await?;
        tracing::debug!(user_id, count, "Deleted notifications");

        self.delete_doc(collections::USERS, user_id).await?;
        tracing::debug!(user_id, "Deleted user profile");

        let deleted_count = count + 1;
        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
