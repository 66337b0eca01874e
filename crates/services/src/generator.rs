use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::HashSet;

use vocab_core::model::{ChapterMastery, ChoiceQuestion, InputQuestion, WordPair};

/// Questions drawn per quiz attempt.
pub const DEFAULT_SAMPLE_SIZE: usize = 30;

/// Wrong options offered next to the correct one in multiple-choice mode.
pub const DISTRACTOR_COUNT: usize = 3;

/// Builds the question list for one quiz attempt.
///
/// Randomness is always passed in, so seeded generators give reproducible
/// sessions in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGenerator {
    sample_size: usize,
}

impl Default for SessionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }

    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Multiple-choice questions for a chapter.
    ///
    /// - The chapter is shuffled and the first `sample_size` words become the
    ///   questions, in shuffled order.
    /// - Each question gets up to `DISTRACTOR_COUNT` distinct wrong options drawn
    ///   from the rest of the chapter, then its options are shuffled.
    /// - An empty chapter yields no questions.
    pub fn choice_questions<R: Rng + ?Sized>(
        &self,
        words: &[WordPair],
        rng: &mut R,
    ) -> Vec<ChoiceQuestion> {
        let selected = self.sample(words.iter().collect(), rng);
        selected
            .into_iter()
            .map(|word| ChoiceQuestion {
                prompt: word.japanese().to_owned(),
                correct_answer: word.english().to_owned(),
                options: options_for(word, words, rng),
            })
            .collect()
    }

    /// Typed-input questions for a chapter.
    ///
    /// Words already mastered are skipped. When every word is mastered the
    /// whole chapter is used again as a review round.
    pub fn input_questions<R: Rng + ?Sized>(
        &self,
        words: &[WordPair],
        mastery: Option<&ChapterMastery>,
        rng: &mut R,
    ) -> Vec<InputQuestion> {
        let mut pool: Vec<&WordPair> = words
            .iter()
            .filter(|word| !mastery.is_some_and(|m| m.is_mastered(word.english())))
            .collect();
        if pool.is_empty() {
            if !words.is_empty() {
                tracing::debug!(words = words.len(), "all words mastered, using review round");
            }
            pool = words.iter().collect();
        }

        self.sample(pool, rng)
            .into_iter()
            .map(InputQuestion::from_word)
            .collect()
    }

    fn sample<'a, R: Rng + ?Sized>(
        &self,
        mut pool: Vec<&'a WordPair>,
        rng: &mut R,
    ) -> Vec<&'a WordPair> {
        pool.shuffle(rng);
        pool.truncate(self.sample_size);
        pool
    }
}

fn options_for<R: Rng + ?Sized>(item: &WordPair, words: &[WordPair], rng: &mut R) -> Vec<String> {
    let mut seen = HashSet::new();
    let candidates: Vec<&str> = words
        .iter()
        .map(WordPair::english)
        .filter(|english| *english != item.english())
        .filter(|english| seen.insert(*english))
        .collect();

    let mut options: Vec<String> = candidates
        .choose_multiple(rng, DISTRACTOR_COUNT)
        .map(|english| (*english).to_owned())
        .collect();
    options.push(item.english().to_owned());
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vocab_core::model::WordStatus;

    fn chapter(size: usize) -> Vec<WordPair> {
        (0..size)
            .map(|i| WordPair::new(format!("word{i}"), format!("単語{i}")).unwrap())
            .collect()
    }

    #[test]
    fn sample_is_bounded_by_chapter_and_sample_size() {
        let generator = SessionGenerator::new();
        let mut rng = StdRng::seed_from_u64(7);

        for size in [0, 1, 4, 29, 30, 31, 120] {
            let words = chapter(size);
            let expected = size.min(DEFAULT_SAMPLE_SIZE);
            assert_eq!(generator.choice_questions(&words, &mut rng).len(), expected);
            assert_eq!(
                generator.input_questions(&words, None, &mut rng).len(),
                expected
            );
        }
    }

    #[test]
    fn choice_questions_have_valid_unique_options() {
        let generator = SessionGenerator::new();
        let mut rng = StdRng::seed_from_u64(42);
        let mut words = chapter(12);
        // duplicate english entries must not leak into the options twice
        words.push(WordPair::new("word3", "別の単語").unwrap());

        for question in generator.choice_questions(&words, &mut rng) {
            assert_eq!(question.options.len(), DISTRACTOR_COUNT + 1);
            assert!(question.options.contains(&question.correct_answer));
            let unique: HashSet<_> = question.options.iter().collect();
            assert_eq!(unique.len(), question.options.len());
        }
    }

    #[test]
    fn small_chapters_get_fewer_options() {
        let generator = SessionGenerator::new();
        let mut rng = StdRng::seed_from_u64(1);

        let two = chapter(2);
        for question in generator.choice_questions(&two, &mut rng) {
            assert_eq!(question.options.len(), 2);
            assert!(question.options.contains(&question.correct_answer));
        }

        let one = chapter(1);
        let questions = generator.choice_questions(&one, &mut rng);
        assert_eq!(questions[0].options, vec!["word0".to_owned()]);
    }

    #[test]
    fn questions_cover_distinct_words() {
        let generator = SessionGenerator::new();
        let mut rng = StdRng::seed_from_u64(99);
        let words = chapter(50);

        let questions = generator.choice_questions(&words, &mut rng);
        let answers: HashSet<_> = questions.iter().map(|q| q.correct_answer.as_str()).collect();
        assert_eq!(answers.len(), DEFAULT_SAMPLE_SIZE);
        for question in &questions {
            let source = words
                .iter()
                .find(|w| w.english() == question.correct_answer)
                .unwrap();
            assert_eq!(question.prompt, source.japanese());
        }
    }

    #[test]
    fn same_seed_gives_same_session() {
        let generator = SessionGenerator::new();
        let words = chapter(40);

        let a = generator.choice_questions(&words, &mut StdRng::seed_from_u64(5));
        let b = generator.choice_questions(&words, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn input_questions_skip_mastered_words() {
        let generator = SessionGenerator::new();
        let mut rng = StdRng::seed_from_u64(3);
        let words = chapter(5);
        let mut mastery = ChapterMastery::new();
        for english in ["word0", "word2", "word4"] {
            mastery.record(english, WordStatus::Correct);
        }
        mastery.record("word1", WordStatus::Wrong);

        let questions = generator.input_questions(&words, Some(&mastery), &mut rng);
        let mut answers: Vec<_> = questions.iter().map(|q| q.correct_answer.as_str()).collect();
        answers.sort_unstable();
        assert_eq!(answers, vec!["word1", "word3"]);
    }

    #[test]
    fn input_questions_fall_back_to_review_when_all_mastered() {
        let generator = SessionGenerator::new();
        let mut rng = StdRng::seed_from_u64(11);
        let words = chapter(5);
        let mut mastery = ChapterMastery::new();
        for word in &words {
            mastery.record(word.english(), WordStatus::Correct);
        }

        let questions = generator.input_questions(&words, Some(&mastery), &mut rng);
        assert_eq!(questions.len(), 5);
    }

    #[test]
    fn custom_sample_size_is_respected() {
        let generator = SessionGenerator::new().with_sample_size(10);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(generator.choice_questions(&chapter(25), &mut rng).len(), 10);
        assert_eq!(generator.sample_size(), 10);
    }
}
