use sqlx::PgPool;
use uuid::Uuid;

pub use crate::reviews::repo_types::Review;

impl Review {
    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Review>> {
        let rows = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, tour_id, user_id, rating, body, created_at
            FROM reviews
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, tour_id, user_id, rating, body, created_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(review)
    }

    pub async fn create(
        db: &PgPool,
        tour_id: Uuid,
        user_id: Uuid,
        rating: i16,
        body: &str,
    ) -> anyhow::Result<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (tour_id, user_id, rating, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tour_id, user_id, rating, body, created_at
            "#,
        )
        .bind(tour_id)
        .bind(user_id)
        .bind(rating)
        .bind(body)
        .fetch_one(db)
        .await?;
        Ok(review)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM reviews WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
