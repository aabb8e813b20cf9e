use std::borrow::Cow;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use skillscout_llm::EmbeddingProvider;

use crate::error::IndexError;
use crate::loader::Skill;

/// Which part of a skill is embedded at build time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBasis {
    #[default]
    Description,
    DescriptionAndContent,
}

impl EmbeddingBasis {
    #[must_use]
    pub fn text_for(self, skill: &Skill) -> Cow<'_, str> {
        match self {
            Self::Description => Cow::Borrowed(skill.description()),
            Self::DescriptionAndContent if skill.content().is_empty() => {
                Cow::Borrowed(skill.description())
            }
            Self::DescriptionAndContent => {
                Cow::Owned(format!("{}\n\n{}", skill.description(), skill.content()))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexedSkill {
    skill: Skill,
    embedding: Vec<f32>,
}

impl IndexedSkill {
    #[must_use]
    pub fn skill(&self) -> &Skill {
        &self.skill
    }

    #[must_use]
    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSkill {
    pub skill: Skill,
    /// `(cosine + 1) / 2`: 1.0 is identical direction, 0.0 opposite.
    pub relevance_score: f32,
}

/// Immutable in-memory skill index; rebuild to change contents.
#[derive(Debug, Default)]
pub struct RetrievalIndex {
    entries: Vec<IndexedSkill>,
    dimension: usize,
    model: Option<String>,
}

impl RetrievalIndex {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Embed every skill, keeping the input order.
    ///
    /// # Errors
    ///
    /// Fails on the first embedding error, an empty vector, or vectors of
    /// differing length; a partial index is never returned.
    pub async fn build<P: EmbeddingProvider>(
        skills: Vec<Skill>,
        provider: &P,
        basis: EmbeddingBasis,
    ) -> Result<Self, IndexError> {
        let start = Instant::now();
        let mut entries = Vec::with_capacity(skills.len());
        let mut dimension = 0;

        for skill in skills {
            let embedding = provider
                .embed(&basis.text_for(&skill))
                .await
                .map_err(|source| IndexError::Embedding {
                    name: skill.name().to_owned(),
                    source,
                })?;

            if embedding.is_empty() {
                return Err(IndexError::EmptyEmbedding(skill.name().to_owned()));
            }
            if dimension == 0 {
                dimension = embedding.len();
            } else if embedding.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }

            entries.push(IndexedSkill { skill, embedding });
        }

        tracing::info!(
            skills = entries.len(),
            dimension,
            model = provider.model(),
            ?basis,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "skill index built"
        );

        Ok(Self {
            entries,
            dimension,
            model: Some(provider.model().to_owned()),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[IndexedSkill] {
        &self.entries
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.entries.iter().map(IndexedSkill::skill)
    }

    /// Vector length shared by all entries; 0 for an empty index.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Embed `query` and return the `top_k` most similar skills.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidTopK`] for `top_k == 0`,
    /// [`IndexError::ModelMismatch`] if `provider` is not the model the index
    /// was built with, and embedding or dimension errors for the query.
    pub async fn search<P: EmbeddingProvider>(
        &self,
        provider: &P,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredSkill>, IndexError> {
        if top_k == 0 {
            return Err(IndexError::InvalidTopK);
        }
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(indexed) = self.model.as_deref()
            && indexed != provider.model()
        {
            return Err(IndexError::ModelMismatch {
                indexed: indexed.to_owned(),
                query: provider.model().to_owned(),
            });
        }

        let query_vec = provider
            .embed(query)
            .await
            .map_err(IndexError::QueryEmbedding)?;
        self.rank(&query_vec, top_k)
    }

    /// Score every entry against `query_vec` and keep the best `top_k`.
    ///
    /// Full linear scan; equal scores keep index order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidTopK`] for `top_k == 0` and
    /// [`IndexError::DimensionMismatch`] if `query_vec` has the wrong length.
    pub fn rank(&self, query_vec: &[f32], top_k: usize) -> Result<Vec<ScoredSkill>, IndexError> {
        if top_k == 0 {
            return Err(IndexError::InvalidTopK);
        }
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query_vec.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query_vec.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, relevance_score(cosine_similarity(query_vec, &e.embedding))))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, relevance_score)| ScoredSkill {
                skill: self.entries[i].skill.clone(),
                relevance_score,
            })
            .collect())
    }
}

#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    dot / denom
}

/// Map cosine similarity from `[-1, 1]` onto `[0, 1]`.
#[must_use]
pub fn relevance_score(cosine: f32) -> f32 {
    if cosine.is_nan() {
        return 0.0;
    }
    ((cosine + 1.0) / 2.0).clamp(0.0, 1.0)
}
