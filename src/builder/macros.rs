//! Macros for ergonomic machine declaration.

/// Declare a machine type with its states and transitions in one block.
///
/// Each state becomes a fresh [`State`](crate::machine::State) created in
/// listing order, so the first listed state is the default initial state.
/// A transition entry maps one source, or a bracketed list of sources, to a
/// destination. Evaluates to `Result<Arc<MachineType>, PropError>`.
///
/// # Example
///
/// ```
/// use propstate::machine;
///
/// let light = machine! {
///     Light {
///         states: [red, green, yellow],
///         transitions: {
///             cycle: { red => green, green => yellow, yellow => red },
///             stop: { [green, yellow] => red },
///         },
///     }
/// }
/// .unwrap();
///
/// let mut instance = light.instantiate().unwrap();
/// assert_eq!(instance.fire("cycle").unwrap().to_string(), "Light::green");
/// assert_eq!(instance.fire("stop").unwrap().to_string(), "Light::red");
/// ```
#[macro_export]
macro_rules! machine {
    (@sources [$($source:ident),+ $(,)?]) => {
        [$(&$source),+]
    };
    (@sources $source:ident) => {
        [&$source]
    };
    (
        $name:ident {
            states: [$($state:ident),* $(,)?]
            $(, transitions: {
                $($transition:ident: { $($from:tt => $to:ident),+ $(,)? }),* $(,)?
            })?
            $(, initial: $initial:ident)?
            $(,)?
        }
    ) => {
        (|| -> ::std::result::Result<
            ::std::sync::Arc<$crate::machine::MachineType>,
            $crate::core::PropError,
        > {
            $(let $state = $crate::machine::State::new();)*
            let builder = $crate::builder::MachineBuilder::new(stringify!($name))
                $(.state(stringify!($state), &$state))*;
            $($(
                let builder = builder.transition(
                    stringify!($transition),
                    $crate::builder::TransitionBuilder::new()
                        $(.map_many($crate::machine!(@sources $from), &$to))+
                        .build()?,
                );
            )*)?
            $(let builder = builder.initial(&$initial);)?
            builder.build()
        })()
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{ErrorKind, PropError};

    #[test]
    fn machine_macro_declares_states_in_order() {
        let kind = machine! {
            Abc {
                states: [a, b, c],
                transitions: {
                    go: { a => b, c => a },
                },
            }
        }
        .unwrap();

        assert_eq!(
            kind.states().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(kind.initial_state(), kind.lookup_state("a"));

        let mut machine = kind.instantiate().unwrap();
        assert_eq!(machine.fire("go").unwrap().to_string(), "Abc::b");
        assert_eq!(machine.fire("go").unwrap_err().kind(), ErrorKind::Transition);
    }

    #[test]
    fn machine_macro_accepts_source_lists_and_initial() {
        let kind = machine! {
            Job {
                states: [queued, running, failed, done],
                transitions: {
                    start: { queued => running },
                    finish: { running => done },
                    abort: { [queued, running] => failed },
                },
                initial: running,
            }
        }
        .unwrap();

        assert_eq!(kind.initial_state(), kind.lookup_state("running"));
        let abort = kind.lookup_transition("abort").unwrap();
        assert_eq!(abort.len(), 2);

        let mut machine = kind.instantiate().unwrap();
        assert_eq!(machine.fire("abort").unwrap().to_string(), "Job::failed");
    }

    #[test]
    fn machine_macro_without_transitions() {
        let kind = machine! {
            Idle {
                states: [only],
            }
        }
        .unwrap();

        assert_eq!(kind.transitions().count(), 0);
        assert!(kind.initial_state().is_some());
    }

    #[test]
    fn machine_macro_reports_duplicate_sources() {
        let result = machine! {
            Broken {
                states: [a, b, c],
                transitions: {
                    split: { a => b, a => c },
                },
            }
        };

        assert!(matches!(result, Err(PropError::DuplicateSource { .. })));
    }
}
