//! Question bank backing the placement gate.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;

/// Errors raised while loading a question bank.
#[derive(Debug, thiserror::Error)]
pub enum QuestionBankError {
    /// The bank file could not be read.
    #[error("failed to read question bank at {path}")]
    Io {
        /// Location of the bank file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The bank contents are not valid TOML.
    #[error("failed to parse question bank")]
    Parse(#[from] toml::de::Error),
    /// The bank holds no questions.
    #[error("question bank contains no questions")]
    Empty,
    /// A question is malformed.
    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion {
        /// Zero-based position of the question in the bank.
        index: usize,
        /// Description of the defect.
        reason: &'static str,
    },
}

/// Multiple-choice question as stored in a bank.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Question {
    /// Text shown above the options.
    pub prompt: String,
    /// Candidate answers in authoring order.
    pub options: Vec<String>,
    /// Index of the correct entry in `options`.
    pub answer: usize,
}

impl Question {
    fn check(&self, index: usize) -> Result<(), QuestionBankError> {
        let reason = if self.prompt.trim().is_empty() {
            "prompt is empty"
        } else if self.options.len() < 2 {
            "at least two options are required"
        } else if self.answer >= self.options.len() {
            "answer index is out of range"
        } else {
            return Ok(());
        };
        Err(QuestionBankError::InvalidQuestion { index, reason })
    }
}

#[derive(Deserialize)]
struct BankFile {
    questions: Vec<Question>,
}

/// Non-empty collection of questions.
#[derive(Clone, Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

const BUILTIN: &[(&str, [&str; 4], usize)] = &[
    ("What is 7 x 8?", ["54", "56", "58", "64"], 1),
    ("What is 144 / 12?", ["10", "11", "12", "14"], 2),
    ("What is 15 + 27?", ["42", "32", "43", "52"], 0),
    ("What is 2 to the power of 5?", ["10", "25", "16", "32"], 3),
    ("What is 9 x 9?", ["72", "81", "90", "99"], 1),
    ("What is 100 - 37?", ["63", "73", "67", "53"], 0),
    ("How many sides does a hexagon have?", ["5", "6", "7", "8"], 1),
    ("What is the square root of 49?", ["6", "8", "7", "9"], 2),
];

impl QuestionBank {
    /// Creates a bank after checking every question.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }
        for (index, question) in questions.iter().enumerate() {
            question.check(index)?;
        }
        Ok(Self { questions })
    }

    /// Arithmetic questions shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        let questions = BUILTIN
            .iter()
            .map(|(prompt, options, answer)| Question {
                prompt: (*prompt).to_owned(),
                options: options.iter().map(|option| (*option).to_owned()).collect(),
                answer: *answer,
            })
            .collect();
        Self { questions }
    }

    /// Parses a bank from TOML text made of `[[questions]]` tables.
    pub fn from_toml_str(contents: &str) -> Result<Self, QuestionBankError> {
        let file: BankFile = toml::from_str(contents)?;
        Self::new(file.questions)
    }

    /// Reads and parses a bank file.
    pub fn load(path: &Path) -> Result<Self, QuestionBankError> {
        let contents = fs::read_to_string(path).map_err(|source| QuestionBankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), questions = bank.len(), "loaded question bank");
        Ok(bank)
    }

    /// Number of questions in the bank.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Reports whether the bank holds no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub(crate) fn present<R>(&self, index: usize, rng: &mut R) -> Option<PresentedQuestion>
    where
        R: Rng + ?Sized,
    {
        let question = self.questions.get(index)?;
        let mut order: Vec<usize> = (0..question.options.len()).collect();
        order.shuffle(rng);
        let correct = order.iter().position(|&original| original == question.answer)?;

        Some(PresentedQuestion {
            bank_index: index,
            prompt: question.prompt.clone(),
            options: order
                .iter()
                .map(|&original| question.options[original].clone())
                .collect(),
            correct,
        })
    }
}

/// Question as shown to the player, with its options shuffled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentedQuestion {
    bank_index: usize,
    prompt: String,
    options: Vec<String>,
    correct: usize,
}

impl PresentedQuestion {
    /// Position of the source question inside its bank.
    #[must_use]
    pub fn bank_index(&self) -> usize {
        self.bank_index
    }

    /// Question text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Options in display order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Display index of the correct option.
    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct
    }

    /// Reports whether the display option at `option` is the right answer.
    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct
    }
}
