// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Course persistence.
//
// A completed CourseDocument is split into lessons of at most LESSON_SIZE
// sentences, preserving generation order. Learning progress is tracked per
// course so a learner resumes where they stopped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::course::{CourseDocument, CourseLevel};

/// Maximum sentences per lesson.
pub const LESSON_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Stored types
// ---------------------------------------------------------------------------

/// A persisted course with its lesson layout.
#[derive(Debug, Clone)]
pub struct SavedCourse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: Option<CourseLevel>,
    /// Lesson ids in course order.
    pub lesson_ids: Vec<String>,
    pub sentence_count: usize,
    pub created_at: DateTime<Utc>,
}

/// One lesson within a course.
#[derive(Debug, Clone)]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    /// Zero-based position within the course.
    pub index: usize,
    pub sentence_count: usize,
}

/// One sentence within a lesson.
#[derive(Debug, Clone)]
pub struct StoredSentence {
    pub id: String,
    pub lesson_id: String,
    /// Zero-based position within the lesson.
    pub position: usize,
    pub source_text: String,
    pub target_text: String,
    pub phonetic: String,
    pub difficulty_tier: String,
}

/// Where a learner currently is inside a course.
#[derive(Debug, Clone)]
pub struct LearningProgress {
    pub course_id: String,
    pub lesson_id: String,
    /// Zero-based position of the last completed sentence in the lesson.
    pub sentence_position: usize,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("course \"{0}\" not found")]
    CourseNotFound(String),

    #[error("lesson \"{0}\" not found")]
    LessonNotFound(String),

    #[error("cannot save a course with no sentences")]
    EmptyCourse,
}

// ---------------------------------------------------------------------------
// CourseRepository trait
// ---------------------------------------------------------------------------

/// Trait for course persistence.
///
/// Implementations must be thread-safe (Send + Sync). Callers hold
/// `Arc<dyn CourseRepository>` and may save from multiple generation runs.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist a completed course, splitting it into lessons. Returns the
    /// stored course with its lesson ids assigned.
    async fn create_course(&self, document: &CourseDocument) -> Result<SavedCourse, RepositoryError>;

    /// Lessons of a course, in course order.
    async fn get_lessons_by_course(&self, course_id: &str) -> Result<Vec<Lesson>, RepositoryError>;

    /// Sentences of a lesson, in lesson order.
    async fn get_sentences_by_lesson(
        &self,
        lesson_id: &str,
    ) -> Result<Vec<StoredSentence>, RepositoryError>;

    /// Record where the learner currently is. Overwrites any previous
    /// position for the same course.
    async fn save_learning_progress(
        &self,
        progress: LearningProgress,
    ) -> Result<(), RepositoryError>;

    /// Last recorded position for a course, if any.
    async fn get_learning_progress(
        &self,
        course_id: &str,
    ) -> Result<Option<LearningProgress>, RepositoryError>;
}

// ---------------------------------------------------------------------------
// InMemoryCourseRepository
// ---------------------------------------------------------------------------

/// In-memory repository backed by `DashMap` for concurrent access.
///
/// Suitable for a single desktop process. For durable storage, implement
/// `CourseRepository` over SQLite or similar.
#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: DashMap<String, SavedCourse>,
    lessons: DashMap<String, Lesson>,
    sentences: DashMap<String, Vec<StoredSentence>>,
    progress: DashMap<String, LearningProgress>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored courses (for testing).
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create_course(
        &self,
        document: &CourseDocument,
    ) -> Result<SavedCourse, RepositoryError> {
        if document.sentences.is_empty() {
            return Err(RepositoryError::EmptyCourse);
        }

        let course_id = Uuid::new_v4().to_string();
        let mut lesson_ids = Vec::new();

        for (index, chunk) in document.sentences.chunks(LESSON_SIZE).enumerate() {
            let lesson_id = Uuid::new_v4().to_string();

            let stored: Vec<StoredSentence> = chunk
                .iter()
                .enumerate()
                .map(|(position, s)| StoredSentence {
                    id: Uuid::new_v4().to_string(),
                    lesson_id: lesson_id.clone(),
                    position,
                    source_text: s.source_text.clone(),
                    target_text: s.target_text.clone(),
                    phonetic: s.phonetic.clone(),
                    difficulty_tier: s.difficulty_tier.clone(),
                })
                .collect();

            self.lessons.insert(
                lesson_id.clone(),
                Lesson {
                    id: lesson_id.clone(),
                    course_id: course_id.clone(),
                    index,
                    sentence_count: stored.len(),
                },
            );
            self.sentences.insert(lesson_id.clone(), stored);
            lesson_ids.push(lesson_id);
        }

        let course = SavedCourse {
            id: course_id.clone(),
            title: document.title.clone(),
            description: document.description.clone(),
            level: document.level,
            lesson_ids,
            sentence_count: document.sentences.len(),
            created_at: Utc::now(),
        };
        self.courses.insert(course_id, course.clone());

        tracing::info!(
            course_id = %course.id,
            lessons = course.lesson_ids.len(),
            sentences = course.sentence_count,
            "course saved"
        );

        Ok(course)
    }

    async fn get_lessons_by_course(&self, course_id: &str) -> Result<Vec<Lesson>, RepositoryError> {
        let course = self
            .courses
            .get(course_id)
            .ok_or_else(|| RepositoryError::CourseNotFound(course_id.to_string()))?;

        let mut lessons = Vec::with_capacity(course.lesson_ids.len());
        for lesson_id in &course.lesson_ids {
            let lesson = self
                .lessons
                .get(lesson_id)
                .ok_or_else(|| RepositoryError::LessonNotFound(lesson_id.clone()))?;
            lessons.push(lesson.clone());
        }
        Ok(lessons)
    }

    async fn get_sentences_by_lesson(
        &self,
        lesson_id: &str,
    ) -> Result<Vec<StoredSentence>, RepositoryError> {
        self.sentences
            .get(lesson_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| RepositoryError::LessonNotFound(lesson_id.to_string()))
    }

    async fn save_learning_progress(
        &self,
        progress: LearningProgress,
    ) -> Result<(), RepositoryError> {
        if !self.courses.contains_key(&progress.course_id) {
            return Err(RepositoryError::CourseNotFound(progress.course_id));
        }
        if !self.lessons.contains_key(&progress.lesson_id) {
            return Err(RepositoryError::LessonNotFound(progress.lesson_id));
        }
        self.progress.insert(progress.course_id.clone(), progress);
        Ok(())
    }

    async fn get_learning_progress(
        &self,
        course_id: &str,
    ) -> Result<Option<LearningProgress>, RepositoryError> {
        Ok(self.progress.get(course_id).map(|entry| entry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::SentenceRecord;

    fn document(sentence_count: usize) -> CourseDocument {
        CourseDocument {
            title: "Test Course".to_string(),
            description: "Testing".to_string(),
            level: Some(CourseLevel::Beginner),
            sentences: (0..sentence_count)
                .map(|i| SentenceRecord {
                    source_text: format!("句{i}"),
                    target_text: format!("sentence {i}"),
                    phonetic: format!("/s{i}/"),
                    difficulty_tier: "easy".to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn create_course_splits_into_lessons_of_ten() {
        let repo = InMemoryCourseRepository::new();
        let course = repo.create_course(&document(23)).await.unwrap();

        assert_eq!(course.sentence_count, 23);
        assert_eq!(course.lesson_ids.len(), 3);

        let lessons = repo.get_lessons_by_course(&course.id).await.unwrap();
        assert_eq!(lessons.len(), 3);
        assert_eq!(lessons[0].index, 0);
        assert_eq!(lessons[0].sentence_count, 10);
        assert_eq!(lessons[1].sentence_count, 10);
        // Remainder goes into the final short lesson
        assert_eq!(lessons[2].sentence_count, 3);
    }

    #[tokio::test]
    async fn sentences_preserve_order_within_lessons() {
        let repo = InMemoryCourseRepository::new();
        let course = repo.create_course(&document(12)).await.unwrap();
        let lessons = repo.get_lessons_by_course(&course.id).await.unwrap();

        let first = repo.get_sentences_by_lesson(&lessons[0].id).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].target_text, "sentence 0");
        assert_eq!(first[9].target_text, "sentence 9");
        assert_eq!(first[9].position, 9);

        let second = repo.get_sentences_by_lesson(&lessons[1].id).await.unwrap();
        assert_eq!(second[0].target_text, "sentence 10");
        assert_eq!(second[0].position, 0);
    }

    #[tokio::test]
    async fn empty_course_is_rejected() {
        let repo = InMemoryCourseRepository::new();
        let err = repo.create_course(&document(0)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::EmptyCourse));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn unknown_course_and_lesson_are_not_found() {
        let repo = InMemoryCourseRepository::new();
        assert!(matches!(
            repo.get_lessons_by_course("nope").await.unwrap_err(),
            RepositoryError::CourseNotFound(_)
        ));
        assert!(matches!(
            repo.get_sentences_by_lesson("nope").await.unwrap_err(),
            RepositoryError::LessonNotFound(_)
        ));
    }

    #[tokio::test]
    async fn progress_overwrites_per_course() {
        let repo = InMemoryCourseRepository::new();
        let course = repo.create_course(&document(15)).await.unwrap();
        let lessons = repo.get_lessons_by_course(&course.id).await.unwrap();

        assert!(repo.get_learning_progress(&course.id).await.unwrap().is_none());

        repo.save_learning_progress(LearningProgress {
            course_id: course.id.clone(),
            lesson_id: lessons[0].id.clone(),
            sentence_position: 4,
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

        repo.save_learning_progress(LearningProgress {
            course_id: course.id.clone(),
            lesson_id: lessons[1].id.clone(),
            sentence_position: 2,
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

        let progress = repo
            .get_learning_progress(&course.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.lesson_id, lessons[1].id);
        assert_eq!(progress.sentence_position, 2);
    }

    #[tokio::test]
    async fn progress_for_unknown_course_is_rejected() {
        let repo = InMemoryCourseRepository::new();
        let err = repo
            .save_learning_progress(LearningProgress {
                course_id: "nope".to_string(),
                lesson_id: "also-nope".to_string(),
                sentence_position: 0,
                updated_at: Utc::now(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::CourseNotFound(_)));
    }
}
