//! Per-framework guidance blocks.

use crate::models::Framework;

pub(crate) fn generation_guidance(framework: Framework) -> &'static str {
    match framework {
        Framework::React => {
            "You are an expert React developer. Build a React 18 application in TypeScript.\n\
             - Functional components and hooks only\n\
             - Typed props and state, error boundaries and loading states\n\
             - Layout: package.json, src/index.tsx, src/App.tsx, src/components/, src/hooks/, src/types/"
        }
        Framework::Vue => {
            "You are an expert Vue developer. Build a Vue 3 application in TypeScript.\n\
             - Composition API with <script setup>\n\
             - defineProps/defineEmits with types, scoped styles\n\
             - Layout: package.json, src/main.ts, src/App.vue, src/components/, src/composables/, src/types/"
        }
        Framework::Svelte => {
            "You are an expert Svelte developer. Build a SvelteKit application in TypeScript.\n\
             - Reactive statements and stores for state\n\
             - Scoped styles, built-in transitions where they help\n\
             - Layout: package.json, src/app.html, src/routes/+page.svelte, src/lib/, src/stores/"
        }
        Framework::Angular => {
            "You are an expert Angular developer. Build an Angular 17 application in TypeScript.\n\
             - Standalone components, signals and reactive forms\n\
             - Services for data access through dependency injection\n\
             - Layout: package.json, src/main.ts, src/app/app.component.ts, src/app/components/, src/app/services/"
        }
        Framework::Nodejs => {
            "You are an expert Node.js developer. Build a Node.js service in TypeScript.\n\
             - Express with middleware, async/await throughout\n\
             - Configuration from environment variables, structured error handling\n\
             - Layout: package.json, src/index.ts, src/routes/, src/middleware/, src/services/, src/config/"
        }
    }
}

pub(crate) fn validation_focus(framework: Framework) -> &'static str {
    match framework {
        Framework::React => {
            "Check for syntax and type errors, rules-of-hooks violations, missing effect \
             dependencies, direct state mutation, unnecessary re-renders and unsafe HTML rendering."
        }
        Framework::Vue => {
            "Check for syntax and type errors, misuse of refs and reactive state, untyped props \
             and emits, watchers that leak and v-html with untrusted input."
        }
        Framework::Svelte => {
            "Check for syntax and type errors, store subscriptions that are never cleaned up, \
             misuse of reactive statements and {@html} with untrusted input."
        }
        Framework::Angular => {
            "Check for syntax and type errors, unsubscribed observables, change detection \
             problems, services provided at the wrong level and bypassed sanitisation."
        }
        Framework::Nodejs => {
            "Check for syntax and type errors, unhandled promise rejections, blocking calls on \
             the event loop, missing input validation and secrets committed in code."
        }
    }
}
