//! Keyword-matching reply generation
//!
//! Pure and deterministic: the same utterance always produces the same
//! reply, with no clock, randomness or network involved.

/// Reply for utterances that match nothing in the table.
pub const FALLBACK_REPLY: &str = "I'm sorry, I don't have an answer for that.";

/// Fixed response table, scanned in declaration order.
///
/// An entry matches when the lowercased utterance contains the lowercased
/// keyword, or any single whitespace-delimited token of it. The first match
/// wins, so broader keywords near the top shadow later entries.
pub(crate) const RESPONSES: &[(&str, &str)] = &[
    ("Hi", "Hello! How can I assist you today?"),
    ("Hello", "Hi there! What can I help you with?"),
    (
        "redux",
        r#"Redux is a state management library often used with React. It provides a centralized store for managing the state of your application. Redux uses actions and reducers to update the state in a predictable way. For example:

```javascript
const initialState = { count: 0 };

function reducer(state = initialState, action) {
  switch (action.type) {
    case 'INCREMENT':
      return { count: state.count + 1 };
    default:
      return state;
  }
}

const store = createStore(reducer);
store.dispatch({ type: 'INCREMENT' });
console.log(store.getState()); // { count: 1 }
```"#,
    ),
    (
        "state management",
        "State management refers to the process of managing the state of an application. Libraries like Redux, Zustand, and MobX are commonly used for state management in React applications. They help centralize and organize state, making it easier to share data across components.",
    ),
    (
        "CSS Grid and Flexbox",
        "CSS Grid is best for creating two-dimensional layouts, while Flexbox is ideal for one-dimensional layouts. Use Grid for complex layouts like dashboards and Flexbox for aligning items or creating navigation bars.",
    ),
    (
        "virtual DOM",
        "The virtual DOM is a lightweight copy of the real DOM. React uses it to optimize updates by comparing the virtual DOM with the real DOM and applying only the necessary changes. This process is called 'reconciliation' and ensures efficient rendering.",
    ),
    (
        "React Context API",
        r#"React's Context API allows you to share state across components without prop drilling. It works by creating a context, providing it at a higher level, and consuming it in child components. For example:

```jsx
const ThemeContext = React.createContext();

function App() {
  const theme = 'dark';
  return (
    <ThemeContext.Provider value={theme}>
      <ChildComponent />
    </ThemeContext.Provider>
  );
}

function ChildComponent() {
  const theme = React.useContext(ThemeContext);
  return <div>The theme is {theme}</div>;
}
```"#,
    ),
    (
        "What is React?",
        "React is a JavaScript library for building user interfaces. It allows developers to create reusable UI components and manage the state of their applications efficiently. React uses a declarative approach, meaning you describe what the UI should look like, and React takes care of updating the DOM to match that description.",
    ),
    (
        "What is JSX?",
        r#"JSX stands for JavaScript XML. It is a syntax extension for JavaScript that allows you to write HTML-like code within JavaScript. For example:

```jsx
const element = <h1>Hello, world!</h1>;
```
JSX makes it easier to write and visualize the structure of your components. Under the hood, JSX is transpiled into JavaScript function calls like `React.createElement`."#,
    ),
    (
        "What are React hooks?",
        r#"React hooks are functions that let you use state and other React features in functional components. Common hooks include:

- `useState`: For managing state.
- `useEffect`: For side effects like data fetching or subscriptions.
- `useContext`: For accessing context values.

For example:

```jsx
import React, { useState } from 'react';

function Counter() {
  const [count, setCount] = useState(0);

  return (
    <div>
      <p>Count: {count}</p>
      <button onClick={() => setCount(count + 1)}>Increment</button>
    </div>
  );
}
```"#,
    ),
    (
        "What is TypeScript?",
        r#"TypeScript is a superset of JavaScript that adds static typing. It helps catch errors during development and improves code readability and maintainability. For example:

```typescript
function add(a: number, b: number): number {
  return a + b;
}

const result = add(2, 3); // TypeScript ensures the arguments are numbers.
```"#,
    ),
];

/// Produce the assistant's reply to a user utterance.
pub fn respond(utterance: &str) -> &'static str {
    let utterance = utterance.to_lowercase();
    for (keyword, reply) in RESPONSES {
        let keyword = keyword.to_lowercase();
        if utterance.contains(&keyword)
            || keyword
                .split_whitespace()
                .any(|token| utterance.contains(token))
        {
            return reply;
        }
    }
    FALLBACK_REPLY
}
